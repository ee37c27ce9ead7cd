use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Ignores values while `predicate` holds. Once it returns false the gate
/// stays open and the predicate is not called again.
#[derive(Clone)]
pub struct DropWhileOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

pub struct DropWhileSubscriber<O, F> {
  observer: O,
  predicate: Option<F>,
}

impl<S, F> Publisher for DropWhileOp<S, F>
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
    self.source.subscribe(Metered::new(DropWhileSubscriber {
      observer: subscriber,
      predicate: Some(self.predicate),
    }))
  }
}

impl<Item, Err, O, F> Subscriber<Item, Err> for DropWhileSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.observer.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if let Some(predicate) = self.predicate.as_mut() {
      if predicate(&value) {
        return Demand::max(1);
      }
      self.predicate = None;
    }
    self.observer.on_next(value)
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn predicate_not_reevaluated_after_first_false() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let recorder = Recorder::unbounded();
    from_iter([1, 2, 5, 1, 7])
      .drop_while(move |v| {
        c.set(c.get() + 1);
        *v < 3
      })
      .subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![5, 1, 7]);
    assert_eq!(calls.get(), 3);
  }

  #[test]
  fn all_dropped_finishes() {
    let recorder = Recorder::with_demand(Demand::max(1));
    from_iter(1..4).drop_while(|_| true).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
