use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Ignores the first `count` values.
#[derive(Clone)]
pub struct DropFirstOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

pub struct DropFirstSubscriber<O> {
  observer: O,
  remaining: usize,
}

impl<S: Publisher> Publisher for DropFirstOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(DropFirstSubscriber {
      observer: subscriber,
      remaining: self.count,
    }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for DropFirstSubscriber<O>
where
  O: Subscriber<Item, Err>,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.remaining > 0 {
      self.remaining -= 1;
      Demand::max(1)
    } else {
      self.observer.on_next(value)
    }
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn drops_a_fixed_count() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..=10).drop_first(3).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![4, 5]);
  }

  #[test]
  fn shorter_source_finishes_empty() {
    let recorder = Recorder::unbounded();
    from_iter(1..=2).drop_first(5).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
