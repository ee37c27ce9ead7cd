use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Suppresses a value equal to the one emitted right before it.
///
/// Only the previous emission is remembered, `1, 1, 2, 1` becomes `1, 2, 1`.
#[derive(Clone)]
pub struct RemoveDuplicatesOp<S> {
  pub(crate) source: S,
}

pub struct RemoveDuplicatesSubscriber<O, Item> {
  observer: O,
  last: Option<Item>,
}

impl<S> Publisher for RemoveDuplicatesOp<S>
where
  S: Publisher,
  S::Item: PartialEq + Clone,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(RemoveDuplicatesSubscriber {
      observer: subscriber,
      last: None,
    }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for RemoveDuplicatesSubscriber<O, Item>
where
  O: Subscriber<Item, Err>,
  Item: PartialEq + Clone,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.last.as_ref() == Some(&value) {
      return Demand::max(1);
    }
    self.last = Some(value.clone());
    self.observer.on_next(value)
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn compares_with_previous_only() {
    let recorder = Recorder::unbounded();
    from_iter([1, 1, 2, 2, 2, 1, 3, 3]).remove_duplicates().subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 1, 3]);
  }

  #[test]
  fn duplicates_do_not_consume_demand() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(["a", "a", "a", "b", "c"]).remove_duplicates().subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec!["a", "b"]);
  }
}
