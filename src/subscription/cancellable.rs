use std::{fmt, rc::Rc};

use super::{Subscription, SubscriptionRef, UpstreamSlot};
use crate::demand::Demand;

impl Subscription for UpstreamSlot {
  fn request(&self, demand: Demand) { UpstreamSlot::request(self, demand) }

  fn cancel(&self) { UpstreamSlot::cancel(self) }
}

/// Cancel-on-drop handle returned by terminal subscribers such as `sink`.
///
/// Keep it alive for as long as the stream should run. Dropping it, or
/// calling [`cancel`](AnyCancellable::cancel), cancels the subscription.
///
/// **Attention:** `let _ = publisher.sink(..)` drops the handle right away;
/// bind it to a named variable instead.
#[must_use]
pub struct AnyCancellable(Option<SubscriptionRef>);

impl AnyCancellable {
  pub fn new(subscription: SubscriptionRef) -> Self { AnyCancellable(Some(subscription)) }

  pub(crate) fn from_slot(slot: UpstreamSlot) -> Self { AnyCancellable(Some(Rc::new(slot))) }

  pub fn cancel(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.cancel();
    }
  }

  /// Keep the handle in `bag`, tying the subscription to the bag's lifetime.
  pub fn store(self, bag: &mut Vec<AnyCancellable>) { bag.push(self); }
}

impl Drop for AnyCancellable {
  fn drop(&mut self) { self.cancel(); }
}

impl fmt::Debug for AnyCancellable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AnyCancellable").field("active", &self.0.is_some()).finish()
  }
}
