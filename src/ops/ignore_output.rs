use std::marker::PhantomData;

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Discards every value and forwards only the completion. The upstream is
/// driven with unbounded demand so it can reach its end.
#[derive(Clone)]
pub struct IgnoreOutputOp<S> {
  pub(crate) source: S,
}

pub struct IgnoreOutputSubscriber<O, Item> {
  observer: O,
  _p: PhantomData<fn(Item)>,
}

impl<S: Publisher> Publisher for IgnoreOutputOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(IgnoreOutputSubscriber {
      observer: subscriber,
      _p: PhantomData,
    }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for IgnoreOutputSubscriber<O, Item>
where
  O: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    subscription.request(Demand::Unbounded);
    self.observer.on_subscribe(subscription)
  }

  #[inline]
  fn on_next(&mut self, _value: Item) -> Demand { Demand::NONE }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn completes_without_downstream_demand() {
    let recorder = Recorder::with_demand(Demand::NONE);
    from_iter(1..=5).ignore_output().subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
