//! Flat-map operator.
//!
//! Maps every upstream value to a publisher and merges the values of all the
//! resulting inner publishers. At most `max_publishers` inner publishers are
//! requested from the upstream up front; each inner publisher that finishes
//! makes room for one more. Inner publishers share the downstream demand the
//! way `merge` sources do.
//!
//! The stream finishes once the upstream and every inner publisher finished.
//! Any failure cancels everything else and ends the stream.

use std::rc::Rc;

use super::relay::{Fan, Gate};
use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef, Upstream, UpstreamSlot},
};

#[derive(Clone)]
pub struct FlatMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) max_publishers: Demand,
  pub(crate) func: F,
}

#[derive(Default)]
struct FlatMapState {
  active: usize,
  outer_finished: bool,
}

struct FlatMapUpstream<Item, Err> {
  outer: UpstreamSlot,
  fan: Fan<Item, Err>,
}

impl<Item: 'static, Err: 'static> Upstream<Item, Err> for FlatMapUpstream<Item, Err> {
  fn request(&mut self, _: Demand) { self.fan.refill() }

  fn cancel(&mut self) {
    self.fan.cancel_all();
    self.outer.cancel();
  }
}

pub struct FlatMapOuterSubscriber<Item, Err, F> {
  outlet: Rc<Outlet<Item, Err>>,
  fan: Fan<Item, Err>,
  outer: UpstreamSlot,
  state: MutRc<FlatMapState>,
  max_publishers: Demand,
  func: F,
}

struct FlatMapInnerSubscriber<Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  fan: Fan<Item, Err>,
  outer: UpstreamSlot,
  state: MutRc<FlatMapState>,
  index: usize,
  bounded: bool,
}

impl<S, F, P> Publisher for FlatMapOp<S, F>
where
  S: Publisher,
  F: FnMut(S::Item) -> P + 'static,
  P: Publisher<Err = S::Err>,
{
  type Item = P::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<P::Item, S::Err> + 'static,
  {
    let outer = UpstreamSlot::new();
    let outlet = Outlet::new(Overflow::Buffer);
    let fan = Fan::new(&outlet, 0, Gate::Open);
    outlet.set_upstream(FlatMapUpstream { outer: outer.clone(), fan: fan.clone() });
    self.source.subscribe(FlatMapOuterSubscriber {
      outlet: outlet.clone(),
      fan,
      outer,
      state: MutRc::own(FlatMapState::default()),
      max_publishers: self.max_publishers,
      func: self.func,
    });
    outlet.attach(Box::new(subscriber));
  }
}

impl<Item, Err, F, P, Out> Subscriber<Item, Err> for FlatMapOuterSubscriber<Out, Err, F>
where
  F: FnMut(Item) -> P,
  P: Publisher<Item = Out, Err = Err>,
  Out: 'static,
  Err: 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.outer.attach(subscription);
    self.outer.request(self.max_publishers);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.outlet.is_closed() {
      return Demand::NONE;
    }
    let inner = (self.func)(value);
    let index = self.fan.add(Gate::Open);
    self.state.rc_deref_mut().active += 1;
    inner.subscribe(FlatMapInnerSubscriber {
      outlet: self.outlet.clone(),
      fan: self.fan.clone(),
      outer: self.outer.clone(),
      state: self.state.clone(),
      index,
      bounded: !self.max_publishers.is_unbounded(),
    });
    self.fan.refill();
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.outer.release();
    match completion {
      Completion::Failed(err) => {
        self.fan.cancel_all();
        self.outlet.complete(Completion::Failed(err));
      }
      Completion::Finished => {
        let idle = {
          let mut state = self.state.rc_deref_mut();
          state.outer_finished = true;
          state.active == 0
        };
        if idle {
          self.outlet.complete(Completion::Finished);
        }
      }
    }
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for FlatMapInnerSubscriber<Item, Err> {
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
        self.outer.cancel();
        self.outlet.complete(Completion::Failed(err));
      }
      Completion::Finished => {
        let done = {
          let mut state = self.state.rc_deref_mut();
          state.active = state.active.saturating_sub(1);
          state.outer_finished && state.active == 0
        };
        if done {
          self.outlet.complete(Completion::Finished);
          return;
        }
        if self.bounded && !self.state.rc_deref().outer_finished {
          self.outer.request(Demand::max(1));
        }
        self.fan.refill();
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn inner_values_are_merged() {
    let recorder = Recorder::unbounded();
    from_iter([1usize, 2, 3])
      .flat_map(Demand::Unbounded, |n| from_iter(vec![n; n]))
      .subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 2, 3, 3, 3]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn later_changes_of_inner_subjects_come_through() {
    let first = CurrentValueSubject::<i32, Never>::new(100);
    let second = CurrentValueSubject::<i32, Never>::new(10);
    let third = CurrentValueSubject::<i32, Never>::new(1);
    let outer = PassthroughSubject::<CurrentValueSubject<i32, Never>, Never>::new();
    let recorder = Recorder::unbounded();
    outer.clone().flat_map(Demand::max(2), |inner| inner).subscribe(recorder.clone());

    outer.send(first.clone());
    outer.send(second.clone());
    outer.send(third.clone());
    first.send(300);
    second.send(20);
    third.send(2);
    first.send(200);

    assert_eq!(recorder.values(), vec![100, 10, 300, 20, 200]);
    assert_eq!(third.subscriber_count(), 0);
  }

  #[test]
  fn finished_inner_makes_room_for_the_next() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..=3)
      .flat_map(Demand::max(1), |n| from_iter(n * 10..n * 10 + 3))
      .subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![10, 11]);
    recorder.request(Demand::max(3));
    assert_eq!(recorder.values(), vec![10, 11, 12, 20, 21]);
    recorder.request(Demand::Unbounded);
    assert_eq!(recorder.values(), vec![10, 11, 12, 20, 21, 22, 30, 31, 32]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn waits_for_the_last_inner_to_finish() {
    let inner = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    just(inner.clone()).flat_map(Demand::Unbounded, |p| p).subscribe(recorder.clone());
    inner.send(5);
    assert!(recorder.completion().is_none());
    inner.send_completion(Completion::Finished);
    assert_eq!(recorder.values(), vec![5]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn inner_failure_cancels_the_rest() {
    let outer = PassthroughSubject::<PassthroughSubject<i32, &'static str>, &'static str>::new();
    let a = PassthroughSubject::<i32, &'static str>::new();
    let b = PassthroughSubject::<i32, &'static str>::new();
    let recorder = Recorder::unbounded();
    outer.clone().flat_map(Demand::Unbounded, |p| p).subscribe(recorder.clone());
    outer.send(a.clone());
    outer.send(b.clone());
    a.send(1);
    b.send_completion(Completion::Failed("b"));
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.completion(), Some(Completion::Failed("b")));
    assert_eq!(a.subscriber_count(), 0);
    assert_eq!(outer.subscriber_count(), 0);
  }

  #[test]
  fn cancel_reaches_every_inner() {
    let outer = PassthroughSubject::<PassthroughSubject<i32, Never>, Never>::new();
    let a = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    outer.clone().flat_map(Demand::Unbounded, |p| p).subscribe(recorder.clone());
    outer.send(a.clone());
    recorder.cancel();
    assert_eq!(a.subscriber_count(), 0);
    assert_eq!(outer.subscriber_count(), 0);
  }
}
