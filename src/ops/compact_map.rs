use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Maps every value to an `Option` and emits the `Some` contents.
#[derive(Clone)]
pub struct CompactMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct CompactMapSubscriber<O, F> {
  observer: O,
  func: F,
}

impl<S, F, B> Publisher for CompactMapOp<S, F>
where
  S: Publisher,
  F: FnMut(S::Item) -> Option<B> + 'static,
  B: 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(CompactMapSubscriber {
      observer: subscriber,
      func: self.func,
    }))
  }
}

impl<Item, Err, O, F, B> Subscriber<Item, Err> for CompactMapSubscriber<O, F>
where
  O: Subscriber<B, Err>,
  F: FnMut(Item) -> Option<B>,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    match (self.func)(value) {
      Some(mapped) => self.observer.on_next(mapped),
      None => Demand::max(1),
    }
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn drops_unparsable() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(["1", "x", "2", "3"])
      .compact_map(|s| s.parse::<i32>().ok())
      .subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2]);
  }
}
