use std::{cell::Cell, rc::Rc};

use super::relay::{Fan, Gate};
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef},
};

/// Interleaves the values of two sources in arrival order.
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  pub(crate) source1: S1,
  pub(crate) source2: S2,
}

/// Interleaves the values of any number of sources of the same type.
#[derive(Clone)]
pub struct MergeAll<P> {
  pub(crate) sources: Vec<P>,
}

/// Merges every publisher in `sources`. An empty list finishes at once.
pub fn merge_all<P: Publisher>(sources: impl IntoIterator<Item = P>) -> MergeAll<P> {
  MergeAll { sources: sources.into_iter().collect() }
}

pub struct MergeSubscriber<Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  fan: Fan<Item, Err>,
  index: usize,
  remaining: Rc<Cell<usize>>,
}

/// Sets up the shared outlet and one subscriber per source. The caller
/// subscribes every source before attaching the downstream to the outlet, so
/// no source runs ahead of the others.
fn merged<Item: 'static, Err: 'static>(
  count: usize,
) -> (Rc<Outlet<Item, Err>>, impl Iterator<Item = MergeSubscriber<Item, Err>>) {
  let outlet = Outlet::new(Overflow::Buffer);
  let fan = Fan::new(&outlet, count, Gate::Open);
  outlet.set_upstream(fan.clone());
  if count == 0 {
    outlet.complete(Completion::Finished);
  }
  let remaining = Rc::new(Cell::new(count));
  let shared = outlet.clone();
  let subscribers = (0..count).map(move |index| MergeSubscriber {
    outlet: shared.clone(),
    fan: fan.clone(),
    index,
    remaining: remaining.clone(),
  });
  (outlet, subscribers)
}

impl<S1, S2> Publisher for MergeOp<S1, S2>
where
  S1: Publisher,
  S2: Publisher<Item = S1::Item, Err = S1::Err>,
{
  type Item = S1::Item;
  type Err = S1::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S1::Item, S1::Err> + 'static,
  {
    let (outlet, mut subscribers) = merged(2);
    if let Some(first) = subscribers.next() {
      self.source1.subscribe(first);
    }
    if let Some(second) = subscribers.next() {
      self.source2.subscribe(second);
    }
    outlet.attach(Box::new(subscriber));
  }
}

impl<P: Publisher> Publisher for MergeAll<P> {
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<P::Item, P::Err> + 'static,
  {
    let (outlet, subscribers) = merged(self.sources.len());
    for (source, merge_subscriber) in self.sources.into_iter().zip(subscribers) {
      source.subscribe(merge_subscriber);
    }
    outlet.attach(Box::new(subscriber));
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for MergeSubscriber<Item, Err> {
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.fan.attach(self.index, subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.fan.received(self.index);
    self.outlet.push(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.fan.finish(self.index);
    match completion {
      Completion::Failed(err) => {
        self.fan.cancel_all();
        self.outlet.complete(Completion::Failed(err));
      }
      Completion::Finished => {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        if left == 0 {
          self.outlet.complete(Completion::Finished);
        } else {
          self.fan.refill();
        }
      }
    }
  }
}
