//! Demand-aware delivery point towards one downstream subscriber.
//!
//! Every node that owns its downstream (sources, subjects, combinators,
//! scheduler-bound operators) hands an `Outlet` to the subscriber as its
//! subscription. The outlet never emits beyond granted demand, serializes all
//! signals through a single drain loop and releases both neighbours once the
//! stream is over.
//!
//! Re-entrancy: a downstream may call `request`/`cancel` from inside
//! `on_next`, and an upstream may push synchronously from inside `request`.
//! Those calls only record their intent while the drain loop is running; the
//! running loop picks the work up, so no callback is ever re-entered.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use super::{Subscription, SubscriptionRef, UpstreamSlot};
use crate::{
  demand::Demand,
  subscriber::{BoxedSubscriber, Completion},
};

/// What to do with a value pushed while the downstream has no demand left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overflow {
  /// Queue it until demand arrives.
  Buffer,
  /// Discard it.
  Drop,
  /// Keep only the newest undelivered value.
  Latest,
}

pub(crate) enum Pulled<Item, Err> {
  Next(Item),
  /// The final value; the source finishes right after it.
  Last(Item),
  Complete(Completion<Err>),
}

/// The producing side of an outlet.
pub(crate) trait Upstream<Item, Err> {
  /// Downstream demand grew by `demand`.
  fn request(&mut self, _demand: Demand) {}

  /// Produce the next signal synchronously. Only called on outlets created
  /// with [`Outlet::pull_source`], and only while demand is outstanding.
  fn pull(&mut self) -> Option<Pulled<Item, Err>> { None }

  /// The downstream is gone, stop producing.
  fn cancel(&mut self) {}
}

impl<Item, Err> Upstream<Item, Err> for UpstreamSlot {
  fn request(&mut self, demand: Demand) { UpstreamSlot::request(self, demand) }

  fn cancel(&mut self) { UpstreamSlot::cancel(self) }
}

struct OutletState<Item, Err> {
  demand: Demand,
  upstream_demand: Demand,
  queue: VecDeque<Item>,
  completion: Option<Completion<Err>>,
  overflow: Overflow,
  pull: bool,
  busy: bool,
  cancelled: bool,
  released: bool,
}

enum Step<Item, Err> {
  Deliver(Item),
  Pull,
  Forward(Demand),
  Release(Option<Completion<Err>>),
  Idle,
}

pub(crate) struct Outlet<Item, Err> {
  state: RefCell<OutletState<Item, Err>>,
  downstream: RefCell<Option<BoxedSubscriber<Item, Err>>>,
  upstream: RefCell<Option<Box<dyn Upstream<Item, Err>>>>,
}

impl<Item: 'static, Err: 'static> Outlet<Item, Err> {
  pub(crate) fn new(overflow: Overflow) -> Rc<Self> {
    Rc::new(Outlet {
      state: RefCell::new(OutletState {
        demand: Demand::NONE,
        upstream_demand: Demand::NONE,
        queue: VecDeque::new(),
        completion: None,
        overflow,
        pull: false,
        // Held until `attach`; signals arriving earlier are only recorded.
        busy: true,
        cancelled: false,
        released: false,
      }),
      downstream: RefCell::new(None),
      upstream: RefCell::new(None),
    })
  }

  /// An outlet whose values come from synchronous pulls on `upstream`.
  pub(crate) fn pull_source(upstream: impl Upstream<Item, Err> + 'static) -> Rc<Self> {
    let outlet = Self::new(Overflow::Buffer);
    outlet.state.borrow_mut().pull = true;
    outlet.set_upstream(upstream);
    outlet
  }

  pub(crate) fn set_upstream(&self, upstream: impl Upstream<Item, Err> + 'static) {
    *self.upstream.borrow_mut() = Some(Box::new(upstream));
  }

  /// Hand this outlet to `downstream` as its subscription and start the
  /// flow with whatever demand `on_subscribe` grants.
  pub(crate) fn attach(self: &Rc<Self>, downstream: BoxedSubscriber<Item, Err>) {
    *self.downstream.borrow_mut() = Some(downstream);
    self.state.borrow_mut().busy = true;
    let subscription: SubscriptionRef = self.clone();
    if let Some(downstream) = self.downstream.borrow_mut().as_mut() {
      downstream.on_subscribe(subscription);
    }
    self.state.borrow_mut().busy = false;
    self.drain();
  }

  /// Offer a value. Returns false when the value was discarded, either
  /// because the outlet is closed or because the overflow policy dropped it.
  pub(crate) fn push(&self, value: Item) -> bool {
    {
      let mut state = self.state.borrow_mut();
      if state.cancelled || state.released || state.completion.is_some() {
        tracing::trace!("value pushed into a closed outlet dropped");
        return false;
      }
      let room = state.demand.covers(state.queue.len() + 1);
      match state.overflow {
        Overflow::Buffer => state.queue.push_back(value),
        Overflow::Drop if room => state.queue.push_back(value),
        Overflow::Drop => return false,
        Overflow::Latest => {
          if !room {
            state.queue.clear();
          }
          state.queue.push_back(value);
        }
      }
    }
    self.drain();
    true
  }

  /// Terminate the stream. A failure overtakes queued values, `Finished`
  /// waits until the queue is delivered.
  pub(crate) fn complete(&self, completion: Completion<Err>) {
    {
      let mut state = self.state.borrow_mut();
      if state.cancelled || state.released || state.completion.is_some() {
        return;
      }
      state.completion = Some(completion);
    }
    self.drain();
  }

  /// Demand that is granted but not yet covered by queued values. None once
  /// the outlet is closed.
  pub(crate) fn unfilled_demand(&self) -> Demand {
    let state = self.state.borrow();
    if state.cancelled || state.released || state.completion.is_some() {
      return Demand::NONE;
    }
    state.demand.saturating_sub(state.queue.len())
  }

  /// True once the outlet accepts no more signals.
  pub(crate) fn is_closed(&self) -> bool {
    let state = self.state.borrow();
    state.cancelled || state.released || state.completion.is_some()
  }

  fn next_step(&self) -> Step<Item, Err> {
    let mut state = self.state.borrow_mut();
    if state.cancelled {
      state.queue.clear();
      state.completion = None;
      return Step::Release(None);
    }
    if matches!(state.completion, Some(Completion::Failed(_))) {
      state.queue.clear();
      return Step::Release(state.completion.take());
    }
    if !state.demand.is_none() {
      if let Some(value) = state.queue.pop_front() {
        state.demand = state.demand.saturating_sub(1);
        return Step::Deliver(value);
      }
      if state.pull && state.completion.is_none() {
        return Step::Pull;
      }
    }
    if state.queue.is_empty() && state.completion.is_some() {
      return Step::Release(state.completion.take());
    }
    if !state.upstream_demand.is_none() && state.completion.is_none() {
      return Step::Forward(std::mem::take(&mut state.upstream_demand));
    }
    Step::Idle
  }

  fn drain(&self) {
    {
      let mut state = self.state.borrow_mut();
      if state.busy || state.released {
        return;
      }
      state.busy = true;
    }
    loop {
      match self.next_step() {
        Step::Deliver(value) => {
          let more = match self.downstream.borrow_mut().as_mut() {
            Some(downstream) => downstream.on_next(value),
            None => Demand::NONE,
          };
          if !more.is_none() {
            let mut state = self.state.borrow_mut();
            state.demand += more;
            state.upstream_demand += more;
          }
        }
        Step::Pull => {
          let pulled = self.upstream.borrow_mut().as_mut().and_then(|u| u.pull());
          let mut state = self.state.borrow_mut();
          match pulled {
            Some(Pulled::Next(value)) => state.queue.push_back(value),
            Some(Pulled::Last(value)) => {
              state.queue.push_back(value);
              state.completion = Some(Completion::Finished);
            }
            Some(Pulled::Complete(completion)) => state.completion = Some(completion),
            None => state.pull = false,
          }
        }
        Step::Forward(demand) => {
          if let Some(upstream) = self.upstream.borrow_mut().as_mut() {
            upstream.request(demand);
          }
        }
        Step::Release(completion) => {
          self.release(completion);
          return;
        }
        Step::Idle => break,
      }
    }
    self.state.borrow_mut().busy = false;
  }

  fn release(&self, completion: Option<Completion<Err>>) {
    {
      let mut state = self.state.borrow_mut();
      state.released = true;
      state.busy = false;
    }
    let upstream = self.upstream.borrow_mut().take();
    let downstream = self.downstream.borrow_mut().take();
    if let Some(mut upstream) = upstream {
      // Cancelling an upstream that already terminated is a no-op.
      upstream.cancel();
    }
    match (downstream, completion) {
      (Some(mut downstream), Some(completion)) => downstream.on_complete(completion),
      (Some(_), None) => tracing::trace!("outlet cancelled, downstream released"),
      _ => {}
    }
  }
}

impl<Item: 'static, Err: 'static> Subscription for Outlet<Item, Err> {
  fn request(&self, demand: Demand) {
    if demand.is_none() {
      return;
    }
    {
      let mut state = self.state.borrow_mut();
      if state.cancelled || state.released {
        return;
      }
      state.demand += demand;
      state.upstream_demand += demand;
    }
    self.drain();
  }

  fn cancel(&self) {
    {
      let mut state = self.state.borrow_mut();
      if state.cancelled || state.released {
        return;
      }
      state.cancelled = true;
    }
    self.drain();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    rc::{MutRc, RcDeref, RcDerefMut},
    subscriber::Subscriber,
  };

  #[derive(Default)]
  struct Log {
    values: Vec<i32>,
    completions: Vec<Completion<&'static str>>,
    subscription: Option<SubscriptionRef>,
  }

  struct Recorder {
    log: MutRc<Log>,
    initial: Demand,
    per_value: Demand,
  }

  impl Subscriber<i32, &'static str> for Recorder {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
      self.log.rc_deref_mut().subscription = Some(subscription.clone());
      subscription.request(self.initial);
    }

    fn on_next(&mut self, value: i32) -> Demand {
      self.log.rc_deref_mut().values.push(value);
      self.per_value
    }

    fn on_complete(&mut self, completion: Completion<&'static str>) {
      self.log.rc_deref_mut().completions.push(completion);
    }
  }

  fn attach(overflow: Overflow, initial: Demand) -> (Rc<Outlet<i32, &'static str>>, MutRc<Log>) {
    let log = MutRc::own(Log::default());
    let outlet = Outlet::new(overflow);
    outlet.attach(Box::new(Recorder { log: log.clone(), initial, per_value: Demand::NONE }));
    (outlet, log)
  }

  #[test]
  fn buffers_until_demand() {
    let (outlet, log) = attach(Overflow::Buffer, Demand::max(1));
    outlet.push(1);
    outlet.push(2);
    outlet.complete(Completion::Finished);
    assert_eq!(log.rc_deref().values, vec![1]);
    assert!(log.rc_deref().completions.is_empty());

    let subscription = log.rc_deref().subscription.clone().unwrap();
    subscription.request(Demand::max(5));
    assert_eq!(log.rc_deref().values, vec![1, 2]);
    assert_eq!(log.rc_deref().completions, vec![Completion::Finished]);
  }

  #[test]
  fn drop_policy_discards_without_demand() {
    let (outlet, log) = attach(Overflow::Drop, Demand::max(1));
    assert!(outlet.push(1));
    assert!(!outlet.push(2));
    log.rc_deref().subscription.clone().unwrap().request(Demand::max(1));
    assert!(outlet.push(3));
    assert_eq!(log.rc_deref().values, vec![1, 3]);
  }

  #[test]
  fn latest_policy_keeps_newest() {
    let (outlet, log) = attach(Overflow::Latest, Demand::NONE);
    outlet.push(1);
    outlet.push(2);
    let subscription = log.rc_deref().subscription.clone().unwrap();
    subscription.request(Demand::max(1));
    assert_eq!(log.rc_deref().values, vec![2]);
  }

  #[test]
  fn failure_overtakes_queue() {
    let (outlet, log) = attach(Overflow::Buffer, Demand::NONE);
    outlet.push(1);
    outlet.complete(Completion::Failed("boom"));
    assert!(log.rc_deref().values.is_empty());
    assert_eq!(log.rc_deref().completions, vec![Completion::Failed("boom")]);
    assert!(outlet.is_closed());
  }

  #[test]
  fn cancel_releases_and_ignores_later_signals() {
    let (outlet, log) = attach(Overflow::Buffer, Demand::Unbounded);
    let subscription = log.rc_deref().subscription.clone().unwrap();
    subscription.cancel();
    subscription.cancel();
    assert!(!outlet.push(1));
    outlet.complete(Completion::Finished);
    assert!(log.rc_deref().values.is_empty());
    assert!(log.rc_deref().completions.is_empty());
  }

  struct Counter {
    next: i32,
    end: i32,
  }

  impl Upstream<i32, &'static str> for Counter {
    fn pull(&mut self) -> Option<Pulled<i32, &'static str>> {
      if self.next < self.end {
        self.next += 1;
        Some(Pulled::Next(self.next))
      } else {
        Some(Pulled::Complete(Completion::Finished))
      }
    }
  }

  #[test]
  fn pull_source_respects_demand() {
    let log = MutRc::own(Log::default());
    let outlet = Outlet::pull_source(Counter { next: 0, end: 10 });
    outlet.attach(Box::new(Recorder {
      log: log.clone(),
      initial: Demand::max(2),
      per_value: Demand::NONE,
    }));
    assert_eq!(log.rc_deref().values, vec![1, 2]);
    assert_eq!(outlet.unfilled_demand(), Demand::NONE);
  }

  #[test]
  fn on_next_demand_is_additive() {
    let log = MutRc::own(Log::default());
    let outlet = Outlet::pull_source(Counter { next: 0, end: 4 });
    outlet.attach(Box::new(Recorder {
      log: log.clone(),
      initial: Demand::max(1),
      per_value: Demand::max(1),
    }));
    assert_eq!(log.rc_deref().values, vec![1, 2, 3, 4]);
    assert_eq!(log.rc_deref().completions, vec![Completion::Finished]);
  }
}
