use super::prefix::Truncate;
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Emits the first value matching `predicate`, then cancels the upstream and
/// finishes. A source finishing without a match finishes empty.
#[derive(Clone)]
pub struct FirstWhereOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

pub type FirstOp<S, Item> = FirstWhereOp<S, fn(&Item) -> bool>;

pub struct FirstWhereSubscriber<O, F> {
  inner: Truncate<O>,
  predicate: F,
}

impl<S, F> Publisher for FirstWhereOp<S, F>
where
  S: Publisher,
  F: FnMut(&S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(FirstWhereSubscriber {
      inner: Truncate::new(subscriber),
      predicate: self.predicate,
    }))
  }
}

impl<Item, Err, O, F> Subscriber<Item, Err> for FirstWhereSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.inner.on_subscribe::<Item, Err>(subscription, false)
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.inner.done {
      return Demand::NONE;
    }
    if !(self.predicate)(&value) {
      return Demand::max(1);
    }
    self.inner.observer.on_next(value);
    self.inner.finish::<Item, Err>();
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.inner.on_complete::<Item, Err>(completion) }
}
