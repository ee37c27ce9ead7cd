//! Zip operator.
//!
//! Pairs values from two sources positionally: the n-th value of one side is
//! always matched with the n-th value of the other, however far apart they
//! arrive. Unmatched values wait in a per-side buffer and count against
//! that side's share of the demand, so neither side runs ahead of what the
//! downstream can take.

use std::{collections::VecDeque, rc::Rc};

use super::relay::{Fan, Gate};
use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef},
};

#[derive(Clone)]
pub struct ZipOp<A, B> {
  pub(crate) source_a: A,
  pub(crate) source_b: B,
}

struct ZipState<A, B> {
  buffer_a: VecDeque<A>,
  buffer_b: VecDeque<B>,
  finished: [bool; 2],
}

impl<A, B> ZipState<A, B> {
  fn pair(&mut self) -> Option<(A, B)> {
    if self.buffer_a.is_empty() || self.buffer_b.is_empty() {
      return None;
    }
    self.buffer_a.pop_front().zip(self.buffer_b.pop_front())
  }

  /// A finished side with nothing left to pair ends the stream.
  fn exhausted(&self) -> bool {
    self.finished[0] && self.buffer_a.is_empty() || self.finished[1] && self.buffer_b.is_empty()
  }
}

pub struct ZipSubscriber<A, B, Err, Item> {
  state: MutRc<ZipState<A, B>>,
  outlet: Rc<Outlet<(A, B), Err>>,
  fan: Fan<(A, B), Err>,
  side: usize,
  store: fn(&mut ZipState<A, B>, Item),
}

fn store_a<A, B>(state: &mut ZipState<A, B>, value: A) { state.buffer_a.push_back(value) }

fn store_b<A, B>(state: &mut ZipState<A, B>, value: B) { state.buffer_b.push_back(value) }

impl<SA, SB> Publisher for ZipOp<SA, SB>
where
  SA: Publisher,
  SB: Publisher<Err = SA::Err>,
{
  type Item = (SA::Item, SB::Item);
  type Err = SA::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Self::Item, SA::Err> + 'static,
  {
    let state =
      MutRc::own(ZipState { buffer_a: VecDeque::new(), buffer_b: VecDeque::new(), finished: [false; 2] });
    let outlet = Outlet::new(Overflow::Buffer);
    let fan = Fan::new(&outlet, 2, Gate::Open);
    outlet.set_upstream(fan.clone());

    self.source_a.subscribe(ZipSubscriber {
      state: state.clone(),
      outlet: outlet.clone(),
      fan: fan.clone(),
      side: 0,
      store: store_a::<SA::Item, SB::Item>,
    });
    self.source_b.subscribe(ZipSubscriber { state, outlet: outlet.clone(), fan, side: 1, store: store_b });
    outlet.attach(Box::new(subscriber));
  }
}

impl<A, B, Err, Item> ZipSubscriber<A, B, Err, Item>
where
  A: 'static,
  B: 'static,
  Err: 'static,
{
  fn finish(&self, completion: Completion<Err>) {
    self.fan.cancel_all();
    self.outlet.complete(completion);
  }
}

impl<A, B, Err, Item> Subscriber<Item, Err> for ZipSubscriber<A, B, Err, Item>
where
  A: 'static,
  B: 'static,
  Err: 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.fan.attach(self.side, subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.fan.received(self.side);
    let (pair, exhausted) = {
      let mut state = self.state.rc_deref_mut();
      (self.store)(&mut state, value);
      let pair = state.pair();
      self.fan.hold(0, state.buffer_a.len());
      self.fan.hold(1, state.buffer_b.len());
      (pair, state.exhausted())
    };
    if let Some(pair) = pair {
      self.outlet.push(pair);
    }
    if exhausted {
      self.finish(Completion::Finished);
    } else {
      self.fan.refill();
    }
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.fan.finish(self.side);
    let exhausted = {
      let mut state = self.state.rc_deref_mut();
      state.finished[self.side] = true;
      state.exhausted()
    };
    if completion.is_failure() || exhausted {
      self.finish(completion);
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn pairs_positionally() {
    let numbers = PassthroughSubject::<i32, Never>::new();
    let letters = PassthroughSubject::<&str, Never>::new();
    let recorder = Recorder::unbounded();
    numbers.clone().zip(letters.clone()).subscribe(recorder.clone());

    numbers.send(1);
    numbers.send(2);
    numbers.send(3);
    letters.send("a");
    assert_eq!(recorder.values(), vec![(1, "a")]);
    letters.send("b");
    letters.send("c");
    assert_eq!(recorder.values(), vec![(1, "a"), (2, "b"), (3, "c")]);
  }

  #[test]
  fn shorter_side_ends_the_stream() {
    let recorder = Recorder::unbounded();
    from_iter(1..=5).zip(from_iter(["a", "b"])).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![(1, "a"), (2, "b")]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn bounded_demand_is_shared_by_both_sides() {
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..=5).zip(from_iter(10..=15)).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![(1, 10), (2, 11)]);
    assert!(recorder.completion().is_none());
    recorder.request(Demand::max(1));
    assert_eq!(recorder.values(), vec![(1, 10), (2, 11), (3, 12)]);
  }

  #[test]
  fn the_side_ahead_waits_for_its_partner() {
    let letters = PassthroughSubject::<&str, Never>::new();
    let recorder = Recorder::with_demand(Demand::max(2));
    from_iter(1..=100).zip(letters.clone()).subscribe(recorder.clone());
    letters.send("a");
    assert_eq!(recorder.values(), vec![(1, "a")]);
    letters.send("b");
    letters.send("c");
    assert_eq!(recorder.values(), vec![(1, "a"), (2, "b")]);
    recorder.request(Demand::max(1));
    letters.send("d");
    assert_eq!(recorder.values(), vec![(1, "a"), (2, "b"), (3, "d")]);
  }

  #[test]
  fn failure_cancels_the_other_side() {
    let letters = PassthroughSubject::<&str, &'static str>::new();
    let recorder = Recorder::unbounded();
    fail::<i32, _>("nope").zip(letters.clone()).subscribe(recorder.clone());
    assert_eq!(recorder.completion(), Some(Completion::Failed("nope")));
    assert_eq!(letters.subscriber_count(), 0);
  }
}
