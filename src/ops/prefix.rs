use std::{cell::Cell, rc::Rc};

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{EmptySubscription, Metered, Subscription, SubscriptionRef},
};

/// Emits at most `count` values, then cancels the upstream and finishes
/// without waiting for the upstream to complete. The upstream is never asked
/// for more than `count` values in total.
#[derive(Clone)]
pub struct PrefixOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

/// Emits values while `predicate` holds; the first failing value is not
/// emitted and ends the stream.
#[derive(Clone)]
pub struct PrefixWhileOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

/// Shared state of the truncating subscribers.
pub(super) struct Truncate<O> {
  pub(super) observer: O,
  upstream: Option<SubscriptionRef>,
  pub(super) done: bool,
}

impl<O> Truncate<O> {
  pub(super) fn new(observer: O) -> Self { Truncate { observer, upstream: None, done: false } }

  pub(super) fn on_subscribe<Item, Err>(&mut self, subscription: SubscriptionRef, finish_now: bool)
  where
    O: Subscriber<Item, Err>,
  {
    if finish_now {
      subscription.cancel();
      self.observer.on_subscribe(EmptySubscription::shared());
      self.finish::<Item, Err>();
    } else {
      self.upstream = Some(subscription.clone());
      self.observer.on_subscribe(subscription);
    }
  }

  pub(super) fn finish<Item, Err>(&mut self)
  where
    O: Subscriber<Item, Err>,
  {
    if self.done {
      return;
    }
    self.done = true;
    if let Some(upstream) = self.upstream.take() {
      tracing::trace!("prefix reached, cancelling upstream");
      upstream.cancel();
    }
    self.observer.on_complete(Completion::Finished);
  }

  pub(super) fn on_complete<Item, Err>(&mut self, completion: Completion<Err>)
  where
    O: Subscriber<Item, Err>,
  {
    if !self.done {
      self.done = true;
      self.upstream = None;
      self.observer.on_complete(completion);
    }
  }
}

pub struct PrefixSubscriber<O> {
  inner: Truncate<O>,
  remaining: usize,
  budget: Rc<Cell<usize>>,
}

/// Takes what is left of `budget` for a grant of `demand`.
fn take_budget(budget: &Cell<usize>, demand: Demand) -> Demand {
  let grant = demand.count().map_or(budget.get(), |n| n.min(budget.get()));
  budget.set(budget.get() - grant);
  Demand::max(grant)
}

struct CappedSubscription {
  upstream: SubscriptionRef,
  budget: Rc<Cell<usize>>,
}

impl Subscription for CappedSubscription {
  fn request(&self, demand: Demand) {
    let grant = take_budget(&self.budget, demand);
    if !grant.is_none() {
      self.upstream.request(grant);
    }
  }

  fn cancel(&self) { self.upstream.cancel() }
}

impl<S: Publisher> Publisher for PrefixOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(PrefixSubscriber {
      inner: Truncate::new(subscriber),
      remaining: self.count,
      budget: Rc::new(Cell::new(self.count)),
    }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for PrefixSubscriber<O>
where
  O: Subscriber<Item, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    let finish_now = self.remaining == 0;
    let capped = Rc::new(CappedSubscription { upstream: subscription, budget: self.budget.clone() });
    self.inner.on_subscribe::<Item, Err>(capped, finish_now)
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.inner.done {
      return Demand::NONE;
    }
    self.remaining -= 1;
    let demand = self.inner.observer.on_next(value);
    if self.remaining == 0 {
      self.inner.finish::<Item, Err>();
      return Demand::NONE;
    }
    take_budget(&self.budget, demand)
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.inner.on_complete::<Item, Err>(completion) }
}

pub struct PrefixWhileSubscriber<O, F> {
  inner: Truncate<O>,
  predicate: F,
}

impl<S, F> Publisher for PrefixWhileOp<S, F>
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
    self.source.subscribe(Metered::new(PrefixWhileSubscriber {
      inner: Truncate::new(subscriber),
      predicate: self.predicate,
    }))
  }
}

impl<Item, Err, O, F> Subscriber<Item, Err> for PrefixWhileSubscriber<O, F>
where
  O: Subscriber<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.inner.on_subscribe::<Item, Err>(subscription, false)
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.inner.done {
      return Demand::NONE;
    }
    if (self.predicate)(&value) {
      self.inner.observer.on_next(value)
    } else {
      self.inner.finish::<Item, Err>();
      Demand::NONE
    }
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.inner.on_complete::<Item, Err>(completion) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn finishes_without_waiting_for_upstream() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().prefix(2).subscribe(recorder.clone());
    subject.send(1);
    subject.send(2);
    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[test]
  fn zero_finishes_immediately() {
    let recorder = Recorder::unbounded();
    from_iter(1..).prefix(0).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn infinite_source_is_cut() {
    let recorder = Recorder::unbounded();
    from_iter(1..).prefix(3).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.completion_count(), 1);
  }

  /// Records the demand it is asked for and never emits.
  #[derive(Clone, Default)]
  struct Requests(Rc<RefCell<Vec<Demand>>>);

  impl Subscription for Requests {
    fn request(&self, demand: Demand) { self.0.borrow_mut().push(demand) }

    fn cancel(&self) {}
  }

  impl Publisher for Requests {
    type Item = i32;
    type Err = Never;

    fn subscribe<S>(self, mut subscriber: S)
    where
      S: Subscriber<i32, Never> + 'static,
    {
      subscriber.on_subscribe(Rc::new(self))
    }
  }

  #[test]
  fn upstream_is_asked_for_count_values_at_most() {
    let requests = Requests::default();
    let recorder = Recorder::<i32, Never>::unbounded();
    requests.clone().map(|v| v + 1).prefix(3).subscribe(recorder.clone());
    recorder.request(Demand::max(5));
    assert_eq!(*requests.0.borrow(), vec![Demand::max(3)]);
  }

  #[test]
  fn prefix_while_stops_at_first_failure() {
    let recorder = Recorder::unbounded();
    from_iter([1, 2, 5, 1]).prefix_while(|v| *v < 3).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
