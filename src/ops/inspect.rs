use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Calls `func` with a reference to every value, leaving the stream as is.
#[derive(Clone)]
pub struct InspectOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct InspectSubscriber<O, F> {
  observer: O,
  func: F,
}

impl<S, F> Publisher for InspectOp<S, F>
where
  S: Publisher,
  F: FnMut(&S::Item) + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(InspectSubscriber { observer: subscriber, func: self.func }))
  }
}

impl<Item, Err, O, F> Subscriber<Item, Err> for InspectSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item),
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    (self.func)(&value);
    self.observer.on_next(value)
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}
