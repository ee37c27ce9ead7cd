//! Switch-to-latest operator.
//!
//! Flattens a publisher of publishers by always following the newest inner
//! publisher. A new inner value cancels the previous inner subscription before
//! the new one is made, and whatever demand the downstream granted but did not
//! see filled moves over to the new inner publisher.
//!
//! The stream finishes once the outer publisher and the current inner
//! publisher have both finished. Any failure ends it immediately.

use std::rc::Rc;

use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef, Upstream, UpstreamSlot},
};

#[derive(Clone)]
pub struct SwitchToLatestOp<S> {
  pub(crate) source: S,
}

#[derive(Default)]
struct SwitchState {
  generation: usize,
  inner: Option<UpstreamSlot>,
  outer_finished: bool,
}

/// Downstream demand goes to the current inner publisher only.
struct SwitchUpstream {
  outer: UpstreamSlot,
  state: MutRc<SwitchState>,
}

impl<Item, Err> Upstream<Item, Err> for SwitchUpstream {
  fn request(&mut self, demand: Demand) {
    let inner = self.state.rc_deref().inner.clone();
    if let Some(inner) = inner {
      inner.request(demand);
    }
  }

  fn cancel(&mut self) {
    let inner = self.state.rc_deref_mut().inner.take();
    if let Some(inner) = inner {
      inner.cancel();
    }
    self.outer.cancel();
  }
}

pub struct SwitchOuterSubscriber<Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  outer: UpstreamSlot,
  state: MutRc<SwitchState>,
}

struct SwitchInnerSubscriber<Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  outer: UpstreamSlot,
  state: MutRc<SwitchState>,
  slot: UpstreamSlot,
  generation: usize,
}

impl<S> Publisher for SwitchToLatestOp<S>
where
  S: Publisher,
  S::Item: Publisher<Err = S::Err>,
{
  type Item = <S::Item as Publisher>::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Self::Item, S::Err> + 'static,
  {
    let outer = UpstreamSlot::new();
    let state = MutRc::own(SwitchState::default());
    let outlet = Outlet::new(Overflow::Buffer);
    outlet.set_upstream(SwitchUpstream { outer: outer.clone(), state: state.clone() });
    outlet.attach(Box::new(subscriber));
    self.source.subscribe(SwitchOuterSubscriber { outlet, outer, state });
  }
}

impl<P, Item, Err> Subscriber<P, Err> for SwitchOuterSubscriber<Item, Err>
where
  P: Publisher<Item = Item, Err = Err>,
  Item: 'static,
  Err: 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.outer.attach(subscription);
    self.outer.request(Demand::Unbounded);
  }

  fn on_next(&mut self, inner: P) -> Demand {
    if self.outlet.is_closed() {
      return Demand::NONE;
    }
    let slot = UpstreamSlot::new();
    let (previous, generation) = {
      let mut state = self.state.rc_deref_mut();
      state.generation += 1;
      (state.inner.replace(slot.clone()), state.generation)
    };
    if let Some(previous) = previous {
      tracing::trace!(generation, "switching to a newer inner publisher");
      previous.cancel();
    }
    slot.request(self.outlet.unfilled_demand());
    inner.subscribe(SwitchInnerSubscriber {
      outlet: self.outlet.clone(),
      outer: self.outer.clone(),
      state: self.state.clone(),
      slot,
      generation,
    });
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.outer.release();
    match completion {
      Completion::Failed(err) => {
        let inner = self.state.rc_deref_mut().inner.take();
        if let Some(inner) = inner {
          inner.cancel();
        }
        self.outlet.complete(Completion::Failed(err));
      }
      Completion::Finished => {
        let inner_active = {
          let mut state = self.state.rc_deref_mut();
          state.outer_finished = true;
          state.inner.is_some()
        };
        if !inner_active {
          self.outlet.complete(Completion::Finished);
        }
      }
    }
  }
}

impl<Item: 'static, Err: 'static> SwitchInnerSubscriber<Item, Err> {
  fn is_current(&self) -> bool { self.state.rc_deref().generation == self.generation }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for SwitchInnerSubscriber<Item, Err> {
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.slot.attach(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.is_current() {
      self.outlet.push(value);
    }
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.slot.release();
    if !self.is_current() {
      return;
    }
    let outer_finished = {
      let mut state = self.state.rc_deref_mut();
      state.inner = None;
      state.outer_finished
    };
    match completion {
      Completion::Failed(err) => {
        self.outer.cancel();
        self.outlet.complete(Completion::Failed(err));
      }
      Completion::Finished if outer_finished => self.outlet.complete(Completion::Finished),
      Completion::Finished => {}
    }
  }
}
