//! Hot publishers that are also fed by hand.
//!
//! A subject broadcasts every `send` to the subscribers attached at that
//! moment, each one bounded by its own demand. Late subscribers miss what was
//! sent before they joined, except for [`CurrentValueSubject`], which hands
//! its current value to every new subscriber.
//!
//! Subjects are cheap handles: clones share the same registry. A subject is a
//! [`Subscriber`](crate::subscriber::Subscriber) too, so it can be subscribed
//! to an upstream publisher and relay it.
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let subject = PassthroughSubject::<&str, Never>::new();
//! let _sub = subject.clone().sink(|v| println!("got {v}"));
//! subject.send("hello");
//! subject.send_completion(Completion::Finished);
//! ```

use crate::{publisher::Publisher, subscriber::Completion};

mod current_value_subject;
mod passthrough_subject;
mod subject_core;

pub use current_value_subject::CurrentValueSubject;
pub use passthrough_subject::PassthroughSubject;

/// A publisher whose values are pushed in imperatively.
pub trait Subject: Publisher + Clone + 'static {
  /// Broadcast `value` to every subscriber with outstanding demand.
  /// Ignored after completion.
  fn send(&self, value: Self::Item);

  /// Terminate every current and future subscription with `completion`.
  fn send_completion(&self, completion: Completion<Self::Err>);
}
