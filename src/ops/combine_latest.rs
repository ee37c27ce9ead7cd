//! Combine-latest operator.
//!
//! Emits `(latest_a, latest_b)` whenever either source emits, once both have
//! emitted at least once. Values that cannot form a tuple yet are not
//! counted against demand. The stream finishes when both sources finished,
//! or as soon as one finishes without ever emitting.
//!
//! Until the first tuple forms, each side is asked for one value at a time
//! and a side already holding a value waits for the other, so a cold source
//! is never drained while its partner stays silent.

use std::rc::Rc;

use super::relay::{Fan, Gate};
use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef},
};

#[derive(Clone)]
pub struct CombineLatestOp<A, B> {
  pub(crate) source_a: A,
  pub(crate) source_b: B,
}

struct CombineState<A, B> {
  latest_a: Option<A>,
  latest_b: Option<B>,
  finished: [bool; 2],
}

impl<A: Clone, B: Clone> CombineState<A, B> {
  fn tuple(&self) -> Option<(A, B)> {
    Some((self.latest_a.clone()?, self.latest_b.clone()?))
  }

  fn has_value(&self, side: usize) -> bool {
    if side == 0 { self.latest_a.is_some() } else { self.latest_b.is_some() }
  }
}

/// One side's subscriber; `store` writes its value into the shared state.
pub struct CombineLatestSubscriber<A, B, Err, Item> {
  state: MutRc<CombineState<A, B>>,
  outlet: Rc<Outlet<(A, B), Err>>,
  fan: Fan<(A, B), Err>,
  side: usize,
  store: fn(&mut CombineState<A, B>, Item),
}

fn store_a<A, B>(state: &mut CombineState<A, B>, value: A) { state.latest_a = Some(value) }

fn store_b<A, B>(state: &mut CombineState<A, B>, value: B) { state.latest_b = Some(value) }

impl<SA, SB> Publisher for CombineLatestOp<SA, SB>
where
  SA: Publisher,
  SB: Publisher<Err = SA::Err>,
  SA::Item: Clone,
  SB::Item: Clone,
{
  type Item = (SA::Item, SB::Item);
  type Err = SA::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Self::Item, SA::Err> + 'static,
  {
    let state = MutRc::own(CombineState { latest_a: None, latest_b: None, finished: [false; 2] });
    let outlet = Outlet::new(Overflow::Buffer);
    let fan = Fan::new(&outlet, 2, Gate::Single);
    outlet.set_upstream(fan.clone());

    self.source_a.subscribe(CombineLatestSubscriber {
      state: state.clone(),
      outlet: outlet.clone(),
      fan: fan.clone(),
      side: 0,
      store: store_a::<SA::Item, SB::Item>,
    });
    self.source_b.subscribe(CombineLatestSubscriber {
      state,
      outlet: outlet.clone(),
      fan,
      side: 1,
      store: store_b,
    });
    outlet.attach(Box::new(subscriber));
  }
}

impl<A, B, Err, Item> Subscriber<Item, Err> for CombineLatestSubscriber<A, B, Err, Item>
where
  A: Clone + 'static,
  B: Clone + 'static,
  Err: 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.fan.attach(self.side, subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.fan.received(self.side);
    let tuple = {
      let mut state = self.state.rc_deref_mut();
      (self.store)(&mut state, value);
      state.tuple()
    };
    match tuple {
      Some(tuple) => {
        self.fan.open_all();
        self.outlet.push(tuple);
      }
      None => self.fan.set_gate(self.side, Gate::Parked),
    }
    self.fan.refill();
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.fan.finish(self.side);
    let done = {
      let mut state = self.state.rc_deref_mut();
      state.finished[self.side] = true;
      completion.is_failure() || state.finished.iter().all(|f| *f) || !state.has_value(self.side)
    };
    if done {
      self.fan.cancel_all();
      self.outlet.complete(completion);
    }
  }
}
