use super::relay::Relay;
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::SubscriptionRef,
};

/// Emits `value` when the upstream finishes without having emitted.
#[derive(Clone)]
pub struct ReplaceEmptyOp<S, Item> {
  pub(crate) source: S,
  pub(crate) value: Item,
}

pub struct ReplaceEmptySubscriber<Item, Err> {
  relay: Relay<Item, Err>,
  fallback: Option<Item>,
}

impl<S, Item> Publisher for ReplaceEmptyOp<S, Item>
where
  S: Publisher<Item = Item>,
  Item: 'static,
{
  type Item = Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Item, S::Err> + 'static,
  {
    let relay = Relay::new();
    relay.attach(Box::new(subscriber));
    self.source.subscribe(ReplaceEmptySubscriber { relay, fallback: Some(self.value) })
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for ReplaceEmptySubscriber<Item, Err> {
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.relay.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.fallback = None;
    self.relay.push(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if let (Completion::Finished, Some(fallback)) = (&completion, self.fallback.take()) {
      self.relay.push(fallback);
    }
    self.relay.finish(completion);
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn empty_source_gets_the_value() {
    let recorder = Recorder::unbounded();
    empty::<&str, Never>().replace_empty("nothing").subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec!["nothing"]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn non_empty_source_is_untouched() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..=3).replace_empty(0).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2]);
    recorder.request(Demand::max(5));
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
