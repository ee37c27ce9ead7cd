use crate::{
  demand::Demand,
  error::Never,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Converts the failure of the upstream with `func`.
#[derive(Clone)]
pub struct MapErrorOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

/// Retypes a stream that cannot fail, so it can be combined with fallible
/// streams.
pub type SetFailureTypeOp<S, E> = MapErrorOp<S, fn(Never) -> E>;

pub(crate) fn absurd<E>(never: Never) -> E { match never {} }

pub struct MapErrorSubscriber<O, F> {
  observer: O,
  func: F,
}

impl<S, F, E> Publisher for MapErrorOp<S, F>
where
  S: Publisher,
  F: FnMut(S::Err) -> E + 'static,
  E: 'static,
{
  type Item = S::Item;
  type Err = E;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, E> + 'static,
  {
    self.source.subscribe(Metered::new(MapErrorSubscriber {
      observer: subscriber,
      func: self.func,
    }))
  }
}

impl<Item, Err, O, F, E> Subscriber<Item, Err> for MapErrorSubscriber<O, F>
where
  O: Subscriber<Item, E>,
  F: FnMut(Err) -> E,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { self.observer.on_next(value) }

  fn on_complete(&mut self, completion: Completion<Err>) {
    let completion = completion.map_err(&mut self.func);
    self.observer.on_complete(completion)
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[derive(Debug, Clone, PartialEq)]
  enum FetchError {
    Offline,
  }

  #[test]
  fn converts_failure() {
    let recorder = Recorder::<i32, _>::unbounded();
    fail::<i32, _>(FetchError::Offline)
      .map_error(|e| RxError::producer(format!("{e:?}")))
      .subscribe(recorder.clone());
    assert_eq!(recorder.completion(), Some(Completion::Failed(RxError::producer("Offline"))));
  }

  #[test]
  fn set_failure_type_keeps_values() {
    let recorder = Recorder::<i32, FetchError>::unbounded();
    just(1).set_failure_type::<FetchError>().subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
