//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core protocol
pub use crate::{
  demand::Demand,
  error::{Never, RxError},
  publisher::Publisher,
  subscriber::{BoxedSubscriber, Completion, Subscriber},
  subscription::{AnyCancellable, EmptySubscription, Subscription, SubscriptionRef},
};
// Sources
pub use crate::publisher::{
  deferred, empty, fail, from_iter, interval, just, AnyPublisher, Deferred, Empty, Fail, Interval,
  Just, Sequence,
};
// Operators
pub use crate::ops::{merge_all, MergeAll, Multicast, PublisherExt, Share};
// Schedulers
#[cfg(feature = "timer")]
pub use crate::scheduler::RunLoopScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
pub use crate::scheduler::{Duration, ImmediateScheduler, Scheduler, TaskHandle, TestScheduler};
// Subjects and sinks
pub use crate::{
  sink::Sink,
  subject::{CurrentValueSubject, PassthroughSubject, Subject},
};
