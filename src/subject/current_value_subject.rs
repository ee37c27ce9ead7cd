use super::{subject_core::SubjectCore, Subject};
use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Overflow, SubscriptionRef},
};

/// A subject holding a current value.
///
/// Every new subscriber receives the current value first (as soon as it has
/// demand), then the live values. A subscriber that falls behind keeps only
/// the newest undelivered value.
pub struct CurrentValueSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
  value: MutRc<Item>,
}

impl<Item, Err> Clone for CurrentValueSubject<Item, Err> {
  fn clone(&self) -> Self { CurrentValueSubject { core: self.core.clone(), value: self.value.clone() } }
}

impl<Item, Err> CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new(value: Item) -> Self { CurrentValueSubject { core: SubjectCore::new(), value: value.into() } }

  pub fn value(&self) -> Item { self.value.rc_deref().clone() }

  /// Replace the current value and broadcast it.
  pub fn send(&self, value: Item) {
    if self.core.is_completed() {
      tracing::warn!("value sent to a completed subject ignored");
      return;
    }
    *self.value.rc_deref_mut() = value.clone();
    self.core.send(value)
  }

  pub fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }

  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }
}

impl<Item, Err> Publisher for CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    let current = self.value();
    self.core.subscribe(Box::new(subscriber), Overflow::Latest, Some(current))
  }
}

impl<Item, Err> Subject for CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  #[inline]
  fn send(&self, value: Item) { CurrentValueSubject::send(self, value) }

  #[inline]
  fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }
}

impl<Item, Err> Subscriber<Item, Err> for CurrentValueSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.core.attach_upstream(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    CurrentValueSubject::send(self, value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.core.send_completion(completion) }
}
