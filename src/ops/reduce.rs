use super::relay::Relay;
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::SubscriptionRef,
};

/// Folds the whole stream and emits the final accumulator once the upstream
/// finishes. An empty upstream emits the seed.
#[derive(Clone)]
pub struct ReduceOp<S, B, F> {
  pub(crate) source: S,
  pub(crate) seed: B,
  pub(crate) func: F,
}

pub type CountOp<S, Item> = ReduceOp<S, usize, fn(usize, Item) -> usize>;

pub type CollectAllOp<S, Item> = ReduceOp<S, Vec<Item>, fn(Vec<Item>, Item) -> Vec<Item>>;

pub(crate) fn count_one<Item>(count: usize, _: Item) -> usize { count + 1 }

pub(crate) fn push_one<Item>(mut all: Vec<Item>, value: Item) -> Vec<Item> {
  all.push(value);
  all
}

pub struct ReduceSubscriber<B, F, Err> {
  relay: Relay<B, Err>,
  acc: Option<B>,
  func: F,
}

impl<S, B, F> Publisher for ReduceOp<S, B, F>
where
  S: Publisher,
  B: 'static,
  F: FnMut(B, S::Item) -> B + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + 'static,
  {
    let relay = Relay::new();
    relay.attach(Box::new(subscriber));
    self.source.subscribe(ReduceSubscriber { relay, acc: Some(self.seed), func: self.func })
  }
}

impl<Item, Err, B, F> Subscriber<Item, Err> for ReduceSubscriber<B, F, Err>
where
  B: 'static,
  Err: 'static,
  F: FnMut(B, Item) -> B,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.relay.on_subscribe(subscription);
    self.relay.slot.request(Demand::Unbounded);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if let Some(acc) = self.acc.take() {
      self.acc = Some((self.func)(acc, value));
    }
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if let (Completion::Finished, Some(acc)) = (&completion, self.acc.take()) {
      self.relay.push(acc);
    }
    self.relay.finish(completion);
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn emits_once_on_finish() {
    let recorder = Recorder::unbounded();
    from_iter(1..=4).reduce(0, |acc, v| acc + v).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![10]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn result_waits_for_demand() {
    let recorder = Recorder::with_demand(Demand::NONE);
    from_iter(1..=4).count().subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert!(recorder.completion().is_none());
    recorder.request(Demand::max(1));
    assert_eq!(recorder.values(), vec![4]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn empty_source_defaults() {
    let count = Recorder::unbounded();
    empty::<i32, Never>().count().subscribe(count.clone());
    assert_eq!(count.values(), vec![0]);

    let all = Recorder::unbounded();
    empty::<i32, Never>().collect_all().subscribe(all.clone());
    assert_eq!(all.values(), vec![Vec::<i32>::new()]);

    let seed = Recorder::unbounded();
    empty::<i32, Never>().reduce(7, |acc, v| acc * v).subscribe(seed.clone());
    assert_eq!(seed.values(), vec![7]);
  }

  #[test]
  fn failure_emits_nothing() {
    let recorder = Recorder::unbounded();
    fail::<i32, _>("bad").collect_all().subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Failed("bad")));
  }

  #[test]
  fn cancel_reaches_upstream() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().count().subscribe(recorder.clone());
    assert_eq!(subject.subscriber_count(), 1);
    recorder.cancel();
    assert_eq!(subject.subscriber_count(), 0);
  }
}
