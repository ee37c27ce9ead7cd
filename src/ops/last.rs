use super::relay::Relay;
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::SubscriptionRef,
};

/// Emits the last value matching `predicate` once the upstream finishes.
#[derive(Clone)]
pub struct LastWhereOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

pub type LastOp<S, Item> = LastWhereOp<S, fn(&Item) -> bool>;

pub struct LastWhereSubscriber<Item, F, Err> {
  relay: Relay<Item, Err>,
  last: Option<Item>,
  predicate: F,
}

impl<S, F> Publisher for LastWhereOp<S, F>
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
    let relay = Relay::new();
    relay.attach(Box::new(subscriber));
    self.source.subscribe(LastWhereSubscriber { relay, last: None, predicate: self.predicate })
  }
}

impl<Item, Err, F> Subscriber<Item, Err> for LastWhereSubscriber<Item, F, Err>
where
  Item: 'static,
  Err: 'static,
  F: FnMut(&Item) -> bool,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.relay.on_subscribe(subscription);
    self.relay.slot.request(Demand::Unbounded);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if (self.predicate)(&value) {
      self.last = Some(value);
    }
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if let (Completion::Finished, Some(last)) = (&completion, self.last.take()) {
      self.relay.push(last);
    }
    self.relay.finish(completion);
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn last_value_on_finish() {
    let recorder = Recorder::unbounded();
    from_iter(1..=5).last().subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![5]);
  }

  #[test]
  fn last_where_matches() {
    let recorder = Recorder::unbounded();
    from_iter(1..=9).last_where(|v| v % 4 == 0).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![8]);
  }

  #[test]
  fn empty_source_finishes_without_value() {
    let recorder = Recorder::unbounded();
    empty::<i32, Never>().last().subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
