//! Publisher trait and the source factories.
//!
//! A publisher is a recipe for a stream: nothing happens until
//! [`Publisher::subscribe`] threads a subscriber through it. Operators are
//! publishers wrapping an upstream publisher; each one subscribes to its
//! upstream with a subscriber of its own and forwards demand upstream, values
//! and completion downstream.
//!
//! Sources come in two flavours:
//!
//! - **cold** ([`Sequence`], [`Just`], [`Deferred`]): every subscribe starts
//!   production from scratch, so each subscriber sees the whole sequence;
//! - **hot** (subjects, `share`, `multicast`): values exist independently of
//!   subscribers and late subscribers only see what comes after they join.
//!
//! Publishers are consumed by `subscribe`; clone a cold publisher to
//! subscribe to it more than once.

use crate::subscriber::Subscriber;

mod boxed;
mod deferred;
mod interval;
mod just;
mod sequence;

pub use boxed::AnyPublisher;
pub use deferred::{deferred, Deferred};
pub use interval::{interval, Interval};
pub use just::{empty, fail, just, Empty, Fail, Just};
pub use sequence::{from_iter, Sequence};

pub trait Publisher {
  type Item: 'static;
  type Err: 'static;

  /// Attach `subscriber`. Before this returns the subscriber has received
  /// exactly one `on_subscribe` call; values then flow as far as its demand
  /// allows.
  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static;
}
