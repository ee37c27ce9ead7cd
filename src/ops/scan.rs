use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Folds every value into an accumulator and emits each intermediate
/// accumulator. The seed itself is never emitted.
#[derive(Clone)]
pub struct ScanOp<S, B, F> {
  pub(crate) source: S,
  pub(crate) seed: B,
  pub(crate) func: F,
}

pub struct ScanSubscriber<O, B, F> {
  observer: O,
  acc: Option<B>,
  func: F,
}

impl<S, B, F> Publisher for ScanOp<S, B, F>
where
  S: Publisher,
  B: Clone + 'static,
  F: FnMut(B, S::Item) -> B + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(ScanSubscriber {
      observer: subscriber,
      acc: Some(self.seed),
      func: self.func,
    }))
  }
}

impl<Item, Err, O, B, F> Subscriber<Item, Err> for ScanSubscriber<O, B, F>
where
  O: Subscriber<B, Err>,
  B: Clone,
  F: FnMut(B, Item) -> B,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    match self.acc.take() {
      Some(acc) => {
        let next = (self.func)(acc, value);
        self.acc = Some(next.clone());
        self.observer.on_next(next)
      }
      None => Demand::NONE,
    }
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn running_total_without_seed() {
    let recorder = Recorder::unbounded();
    from_iter(1..=4).scan(100, |acc, v| acc + v).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![101, 103, 106, 110]);
  }

  #[test]
  fn empty_source_emits_nothing() {
    let recorder = Recorder::unbounded();
    empty::<i32, Never>().scan(0, |acc, v| acc + v).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn each_subscription_starts_from_the_seed() {
    let source = from_iter(1..=2).scan(0, |acc, v| acc + v);
    let first = Recorder::unbounded();
    let second = Recorder::unbounded();
    source.clone().subscribe(first.clone());
    source.subscribe(second.clone());
    assert_eq!(first.values(), vec![1, 3]);
    assert_eq!(second.values(), vec![1, 3]);
  }
}
