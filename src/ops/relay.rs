use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::{
  demand::Demand,
  rc::{MutRc, RcDerefMut},
  subscriber::{BoxedSubscriber, Completion},
  subscription::{Outlet, Overflow, SubscriptionRef, Upstream, UpstreamSlot},
};

/// Operator node that owns its downstream.
///
/// Values go out through an outlet, demand goes up through a slot holding the
/// upstream subscription. Used by operators that emit on completion, on a
/// timer, from several sources, or from a replacement source.
pub(crate) struct Relay<Out, Err> {
  pub(crate) outlet: Rc<Outlet<Out, Err>>,
  pub(crate) slot: UpstreamSlot,
}

impl<Out, Err> Clone for Relay<Out, Err> {
  fn clone(&self) -> Self { Relay { outlet: self.outlet.clone(), slot: self.slot.clone() } }
}

impl<Out: 'static, Err: 'static> Relay<Out, Err> {
  /// A relay forwarding downstream demand to its slot. Callers may replace
  /// the outlet's upstream before `attach`.
  pub(crate) fn new() -> Self {
    let outlet = Outlet::new(Overflow::Buffer);
    let slot = UpstreamSlot::new();
    outlet.set_upstream(slot.clone());
    Relay { outlet, slot }
  }

  pub(crate) fn attach(&self, downstream: BoxedSubscriber<Out, Err>) { self.outlet.attach(downstream) }

  #[inline]
  pub(crate) fn on_subscribe(&self, subscription: SubscriptionRef) { self.slot.attach(subscription) }

  #[inline]
  pub(crate) fn push(&self, value: Out) -> bool { self.outlet.push(value) }

  /// The upstream terminated on its own.
  pub(crate) fn finish(&self, completion: Completion<Err>) {
    self.slot.release();
    self.outlet.complete(completion);
  }

  /// Stop the upstream and terminate downstream.
  pub(crate) fn abort(&self, completion: Completion<Err>) {
    self.slot.cancel();
    self.outlet.complete(completion);
  }
}

/// How much of the outlet's unfilled demand one source of a [`Fan`] may have
/// outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
  /// All of it, less the values the source has waiting for a partner.
  Open,
  /// At most one value.
  Single,
  /// Nothing for the rest of the current refill; one value again afterwards.
  Parked,
}

struct Branch {
  slot: UpstreamSlot,
  outstanding: Demand,
  held: usize,
  gate: Gate,
  done: bool,
}

impl Branch {
  fn new(gate: Gate) -> Self {
    Branch { slot: UpstreamSlot::new(), outstanding: Demand::NONE, held: 0, gate, done: false }
  }

  /// Demand missing for this branch to reach its share of `target`.
  fn shortfall(&self, target: Demand) -> Demand {
    if self.done {
      return Demand::NONE;
    }
    let share = match self.gate {
      Gate::Parked => return Demand::NONE,
      Gate::Single => match target.saturating_sub(self.held) {
        Demand::Unbounded => Demand::max(1),
        Demand::Max(n) => Demand::max(n.min(1)),
      },
      Gate::Open => target.saturating_sub(self.held),
    };
    match (share, self.outstanding) {
      (_, Demand::Unbounded) => Demand::NONE,
      (Demand::Unbounded, _) => Demand::Unbounded,
      (Demand::Max(share), Demand::Max(outstanding)) => Demand::max(share.saturating_sub(outstanding)),
    }
  }
}

struct FanState {
  branches: SmallVec<[Branch; 2]>,
  cursor: usize,
  refilling: bool,
}

/// Upstream side of an operator merging several sources into one outlet.
///
/// Sources never get more than the outlet can take: each one may have at
/// most the outlet's unfilled demand outstanding, and grants rotate between
/// sources so a bounded downstream is not served by the first source alone.
/// Re-entrant refills (a source emitting inside `request`) are folded into
/// the running one.
pub(crate) struct Fan<Out, Err> {
  state: MutRc<FanState>,
  outlet: Weak<Outlet<Out, Err>>,
}

impl<Out, Err> Clone for Fan<Out, Err> {
  fn clone(&self) -> Self { Fan { state: self.state.clone(), outlet: self.outlet.clone() } }
}

impl<Out: 'static, Err: 'static> Fan<Out, Err> {
  pub(crate) fn new(outlet: &Rc<Outlet<Out, Err>>, len: usize, gate: Gate) -> Self {
    let branches = (0..len).map(|_| Branch::new(gate)).collect();
    Fan {
      state: MutRc::own(FanState { branches, cursor: 0, refilling: false }),
      outlet: Rc::downgrade(outlet),
    }
  }

  /// Add a source and return its index. Indices of finished sources are
  /// reused.
  pub(crate) fn add(&self, gate: Gate) -> usize {
    let mut state = self.state.rc_deref_mut();
    match state.branches.iter().position(|b| b.done) {
      Some(index) => {
        state.branches[index] = Branch::new(gate);
        index
      }
      None => {
        state.branches.push(Branch::new(gate));
        state.branches.len() - 1
      }
    }
  }

  pub(crate) fn attach(&self, index: usize, subscription: SubscriptionRef) {
    let slot = self.state.rc_deref_mut().branches[index].slot.clone();
    slot.attach(subscription);
  }

  /// Account one value received from source `index`.
  pub(crate) fn received(&self, index: usize) {
    let mut state = self.state.rc_deref_mut();
    let branch = &mut state.branches[index];
    branch.outstanding = branch.outstanding.saturating_sub(1);
  }

  /// Values of source `index` still waiting for a partner; they count
  /// against its share.
  pub(crate) fn hold(&self, index: usize, held: usize) { self.state.rc_deref_mut().branches[index].held = held }

  pub(crate) fn set_gate(&self, index: usize, gate: Gate) { self.state.rc_deref_mut().branches[index].gate = gate }

  pub(crate) fn open_all(&self) {
    self.state.rc_deref_mut().branches.iter_mut().for_each(|b| b.gate = Gate::Open)
  }

  /// Source `index` terminated on its own.
  pub(crate) fn finish(&self, index: usize) {
    let slot = {
      let mut state = self.state.rc_deref_mut();
      let branch = &mut state.branches[index];
      branch.done = true;
      branch.slot.clone()
    };
    slot.release();
  }

  pub(crate) fn cancel_all(&self) {
    let slots: SmallVec<[UpstreamSlot; 2]> = {
      let mut state = self.state.rc_deref_mut();
      state
        .branches
        .iter_mut()
        .filter(|b| !b.done)
        .map(|b| {
          b.done = true;
          b.slot.clone()
        })
        .collect()
    };
    slots.iter().for_each(UpstreamSlot::cancel);
  }

  /// Top every source up to its share of the outlet's unfilled demand.
  pub(crate) fn refill(&self) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.refilling {
        return;
      }
      state.refilling = true;
      state.branches.iter_mut().filter(|b| b.gate == Gate::Parked).for_each(|b| b.gate = Gate::Single);
    }
    while let Some((slot, demand)) = self.next_grant() {
      slot.request(demand);
    }
    self.state.rc_deref_mut().refilling = false;
  }

  fn next_grant(&self) -> Option<(UpstreamSlot, Demand)> {
    let target = self.outlet.upgrade().map_or(Demand::NONE, |outlet| outlet.unfilled_demand());
    if target.is_none() {
      return None;
    }
    let mut state = self.state.rc_deref_mut();
    let len = state.branches.len();
    let start = state.cursor;
    (0..len).map(|offset| (start + offset) % len).find_map(|index| {
      let branch = &mut state.branches[index];
      let shortfall = branch.shortfall(target);
      if shortfall.is_none() {
        return None;
      }
      branch.outstanding += shortfall;
      let slot = branch.slot.clone();
      state.cursor = (index + 1) % len;
      Some((slot, shortfall))
    })
  }
}

impl<Out: 'static, Err: 'static> Upstream<Out, Err> for Fan<Out, Err> {
  fn request(&mut self, _: Demand) { self.refill() }

  fn cancel(&mut self) { self.cancel_all() }
}
