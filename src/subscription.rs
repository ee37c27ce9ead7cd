//! Subscription handles.
//!
//! A [`Subscription`] is the link between one publisher and one subscriber.
//! The subscriber uses it to grant demand and to cancel; the publisher owns
//! the state behind it. Handles are shared (`Rc<dyn Subscription>`), all
//! operations take `&self` and are idempotent once the subscription ended.

use std::rc::Rc;

use crate::demand::Demand;

mod cancellable;
mod metered;
mod outlet;
mod upstream_slot;

pub use cancellable::AnyCancellable;
pub(crate) use metered::Metered;
pub(crate) use outlet::{Outlet, Overflow, Pulled, Upstream};
pub(crate) use upstream_slot::UpstreamSlot;

pub trait Subscription {
  /// Grant `demand` more values. `Demand::NONE` is a no-op, as is any request
  /// after cancellation or completion.
  fn request(&self, demand: Demand);

  /// Stop the flow. Cancellation travels upstream through every operator
  /// node; calling it twice has no further effect.
  fn cancel(&self);
}

/// Shared subscription handle handed to subscribers.
pub type SubscriptionRef = Rc<dyn Subscription>;

/// Subscription of a stream that is already over (or never starts).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
  fn request(&self, _demand: Demand) {}

  fn cancel(&self) {}
}

impl EmptySubscription {
  pub fn shared() -> SubscriptionRef { Rc::new(EmptySubscription) }
}
