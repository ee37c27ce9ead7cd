//! # rxdemand: demand-driven reactive streams
//!
//! Publishers, subscribers, subjects and a small operator algebra with
//! backpressure: a subscriber states how many values it wants, and nothing
//! upstream ever emits beyond that.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let _sub = from_iter(1..=10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .sink(|v| println!("Value: {v}"));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Publisher`] | A recipe for a stream; nothing runs until `subscribe` |
//! | [`Subscriber`] | Receives the subscription, values and one completion |
//! | [`Subscription`] | Grants demand and cancels |
//! | [`Demand`] | How many more values a subscriber accepts |
//! | [`PassthroughSubject`] / [`CurrentValueSubject`] | Hot publishers fed by hand |
//! | [`Scheduler`] | Where deferred work runs and how time is measured |
//!
//! Everything runs on one thread. Values, errors and subscribers are
//! `'static`, and all shared state lives behind `Rc`.
//!
//! ## Feature Flags
//!
//! - **`timer`** (default): [`RunLoopScheduler`](scheduler::RunLoopScheduler),
//!   an executor-backed scheduler built on `futures` and `futures-time`
//! - **`tokio-scheduler`**: a scheduler spawning on a tokio `LocalSet`
//!
//! [`Publisher`]: publisher::Publisher
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Demand`]: demand::Demand
//! [`PassthroughSubject`]: subject::PassthroughSubject
//! [`CurrentValueSubject`]: subject::CurrentValueSubject
//! [`Scheduler`]: scheduler::Scheduler

pub mod demand;
pub mod error;
pub mod ops;
pub mod prelude;
pub mod publisher;
pub mod rc;
pub mod scheduler;
pub mod sink;
pub mod subject;
pub mod subscriber;
pub mod subscription;

#[cfg(test)]
mod test_util;

pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
