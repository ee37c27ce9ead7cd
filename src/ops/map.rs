use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Transforms every value with `func`. Demand passes through 1:1.
#[derive(Clone)]
pub struct MapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct MapSubscriber<O, F> {
  observer: O,
  func: F,
}

impl<S, F, B> Publisher for MapOp<S, F>
where
  S: Publisher,
  F: FnMut(S::Item) -> B + 'static,
  B: 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(MapSubscriber { observer: subscriber, func: self.func }))
  }
}

impl<Item, Err, O, F, B> Subscriber<Item, Err> for MapSubscriber<O, F>
where
  O: Subscriber<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { self.observer.on_next((self.func)(value)) }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}
