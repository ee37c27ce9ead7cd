use std::rc::Rc;

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, Subscription, SubscriptionRef},
};

/// Groups values into `Vec`s of `count` items.
///
/// Each unit of downstream demand asks the upstream for `count` values. A
/// short final group is emitted when the upstream finishes; a failure drops
/// it.
#[derive(Clone)]
pub struct CollectOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

pub struct CollectSubscriber<O, Item> {
  observer: O,
  count: usize,
  buffer: Vec<Item>,
}

/// Scales every request by the group size.
struct ScaledSubscription {
  inner: SubscriptionRef,
  factor: usize,
}

impl Subscription for ScaledSubscription {
  fn request(&self, demand: Demand) { self.inner.request(demand.saturating_mul(self.factor)) }

  fn cancel(&self) { self.inner.cancel() }
}

impl<S: Publisher> Publisher for CollectOp<S> {
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Vec<S::Item>, S::Err> + 'static,
  {
    let count = self.count.max(1);
    self.source.subscribe(Metered::new(CollectSubscriber {
      observer: subscriber,
      count,
      buffer: Vec::with_capacity(count),
    }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for CollectSubscriber<O, Item>
where
  O: Subscriber<Vec<Item>, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.observer.on_subscribe(Rc::new(ScaledSubscription { inner: subscription, factor: self.count }))
  }

  fn on_next(&mut self, value: Item) -> Demand {
    self.buffer.push(value);
    if self.buffer.len() < self.count {
      return Demand::NONE;
    }
    let group = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.count));
    self.observer.on_next(group).saturating_mul(self.count)
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if matches!(completion, Completion::Finished) && !self.buffer.is_empty() {
      self.observer.on_next(std::mem::take(&mut self.buffer));
    }
    self.buffer.clear();
    self.observer.on_complete(completion)
  }
}
