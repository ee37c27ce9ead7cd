use std::{cell::Cell, rc::Rc};

use super::{Subscription, SubscriptionRef};
use crate::{
  demand::Demand,
  error::protocol_violation,
  subscriber::{Completion, Subscriber},
};

/// Accounts the demand granted to an upstream and reports every value that
/// arrives beyond it.
///
/// Pass-through operators hand the upstream subscription straight to their
/// downstream, so nothing else in the chain sees both the grants and the
/// deliveries. Excess values are dropped after the violation is reported.
pub(crate) struct Metered<O> {
  observer: O,
  granted: Rc<Cell<Demand>>,
}

impl<O> Metered<O> {
  pub(crate) fn new(observer: O) -> Self { Metered { observer, granted: Rc::new(Cell::new(Demand::NONE)) } }
}

struct MeteredSubscription {
  upstream: SubscriptionRef,
  granted: Rc<Cell<Demand>>,
}

impl Subscription for MeteredSubscription {
  fn request(&self, demand: Demand) {
    self.granted.set(self.granted.get() + demand);
    self.upstream.request(demand)
  }

  fn cancel(&self) { self.upstream.cancel() }
}

impl<Item, Err, O> Subscriber<Item, Err> for Metered<O>
where
  O: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    let granted = self.granted.clone();
    self.observer.on_subscribe(Rc::new(MeteredSubscription { upstream: subscription, granted }))
  }

  fn on_next(&mut self, value: Item) -> Demand {
    let mut granted = self.granted.get();
    if let Err(err) = granted.checked_decrement() {
      protocol_violation(err);
      return Demand::NONE;
    }
    self.granted.set(granted);
    let more = self.observer.on_next(value);
    self.granted.set(self.granted.get() + more);
    more
  }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.observer.on_complete(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  /// Ignores demand and pushes `0..n` straight away.
  struct Flood(u32);

  impl Publisher for Flood {
    type Item = u32;
    type Err = Never;

    fn subscribe<S>(self, mut subscriber: S)
    where
      S: Subscriber<u32, Never> + 'static,
    {
      subscriber.on_subscribe(EmptySubscription::shared());
      for value in 0..self.0 {
        subscriber.on_next(value);
      }
      subscriber.on_complete(Completion::Finished);
    }
  }

  #[test]
  fn deliveries_within_demand_pass() {
    let recorder = Recorder::with_demand(Demand::max(3));
    Flood(3).map(|v| v * 10).filter(|_| true).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![0, 10, 20]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn demand_returned_from_on_next_counts() {
    let recorder = Recorder::with_demand(Demand::max(1)).returning(Demand::max(1));
    Flood(4).map(|v| v + 1).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3, 4]);
  }

  #[test]
  #[cfg(debug_assertions)]
  #[should_panic(expected = "value delivered without outstanding demand")]
  fn over_delivery_fails_loudly() {
    Flood(5).map(|v| v * 10).filter(|_| true).subscribe(Recorder::with_demand(Demand::max(1)));
  }

  #[test]
  #[cfg(not(debug_assertions))]
  fn over_delivery_is_dropped() {
    let recorder = Recorder::with_demand(Demand::max(1));
    Flood(5).map(|v| v * 10).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![0]);
  }
}
