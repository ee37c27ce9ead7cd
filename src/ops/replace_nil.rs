use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Unwraps `Option` values, emitting a clone of `value` for every `None`.
#[derive(Clone)]
pub struct ReplaceNilOp<S, T> {
  pub(crate) source: S,
  pub(crate) value: T,
}

pub struct ReplaceNilSubscriber<O, T> {
  observer: O,
  value: T,
}

impl<S, T> Publisher for ReplaceNilOp<S, T>
where
  S: Publisher<Item = Option<T>>,
  T: Clone + 'static,
{
  type Item = T;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<T, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(ReplaceNilSubscriber {
      observer: subscriber,
      value: self.value,
    }))
  }
}

impl<Err, O, T> Subscriber<Option<T>, Err> for ReplaceNilSubscriber<O, T>
where
  O: Subscriber<T, Err>,
  T: Clone,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Option<T>) -> Demand {
    let value = value.unwrap_or_else(|| self.value.clone());
    self.observer.on_next(value)
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}
