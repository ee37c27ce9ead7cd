use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Emits only the values satisfying `filter`.
///
/// Every suppressed value gives one unit of demand back to the upstream, so
/// a bounded downstream grant is filled without further requests.
#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

pub struct FilterSubscriber<O, F> {
  observer: O,
  filter: F,
}

impl<S, F> Publisher for FilterOp<S, F>
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
    self.source.subscribe(Metered::new(FilterSubscriber {
      observer: subscriber,
      filter: self.filter,
    }))
  }
}

impl<Item, Err, O, F> Subscriber<Item, Err> for FilterSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if (self.filter)(&value) {
      self.observer.on_next(value)
    } else {
      Demand::max(1)
    }
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn never_stalls_under_bounded_demand() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..10).filter(|v| v % 2 == 0).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![2, 4]);
    assert!(recorder.completion().is_none());

    recorder.request(Demand::max(10));
    assert_eq!(recorder.values(), vec![2, 4, 6, 8]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn everything_suppressed_still_finishes() {
    let recorder = Recorder::with_demand(Demand::max(1));
    from_iter(1..5).filter(|_| false).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
