use super::{subject_core::SubjectCore, Subject};
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Overflow, SubscriptionRef},
};

/// Broadcasts sent values to current subscribers, replaying nothing.
///
/// A subscriber without outstanding demand at the moment of a `send` does not
/// receive that value; it is not queued for later.
pub struct PassthroughSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> Clone for PassthroughSubject<Item, Err> {
  fn clone(&self) -> Self { PassthroughSubject { core: self.core.clone() } }
}

impl<Item, Err> Default for PassthroughSubject<Item, Err> {
  fn default() -> Self { PassthroughSubject { core: SubjectCore::default() } }
}

impl<Item, Err> PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub fn new() -> Self { Self::default() }

  pub fn send(&self, value: Item) { self.core.send(value) }

  pub fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }

  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

  pub fn is_completed(&self) -> bool { self.core.is_completed() }

  pub(crate) fn core(&self) -> &SubjectCore<Item, Err> { &self.core }
}

impl<Item, Err> Publisher for PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    self.core.subscribe(Box::new(subscriber), Overflow::Drop, None)
  }
}

impl<Item, Err> Subject for PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  #[inline]
  fn send(&self, value: Item) { self.core.send(value) }

  #[inline]
  fn send_completion(&self, completion: Completion<Err>) { self.core.send_completion(completion) }
}

impl<Item, Err> Subscriber<Item, Err> for PassthroughSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.core.attach_upstream(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.core.send(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.core.send_completion(completion) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn late_subscriber_misses_earlier_values() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let early = Recorder::unbounded();
    subject.clone().subscribe(early.clone());
    subject.send(1);

    let late = Recorder::unbounded();
    subject.clone().subscribe(late.clone());
    subject.send(2);

    assert_eq!(early.values(), vec![1, 2]);
    assert_eq!(late.values(), vec![2]);
  }

  #[test]
  fn each_subscriber_has_its_own_demand() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let one = Recorder::with_demand(Demand::max(1));
    let all = Recorder::unbounded();
    subject.clone().subscribe(one.clone());
    subject.clone().subscribe(all.clone());

    subject.send(1);
    subject.send(2);
    one.request(Demand::max(1));
    subject.send(3);

    assert_eq!(one.values(), vec![1, 3]);
    assert_eq!(all.values(), vec![1, 2, 3]);
  }

  #[test]
  fn completion_clears_registry_and_reaches_late_subscribers() {
    let subject = PassthroughSubject::<i32, &'static str>::new();
    let before = Recorder::unbounded();
    subject.clone().subscribe(before.clone());
    subject.send_completion(Completion::Failed("down"));
    subject.send(1);
    assert_eq!(subject.subscriber_count(), 0);

    let after = Recorder::unbounded();
    subject.clone().subscribe(after.clone());
    assert!(before.values().is_empty());
    assert_eq!(before.completion(), Some(Completion::Failed("down")));
    assert_eq!(after.completion(), Some(Completion::Failed("down")));
    assert_eq!(before.completion_count(), 1);
  }

  #[test]
  fn cancel_mid_fan_out_stops_delivery() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let quitter = Recorder::unbounded().cancel_after(1);
    let stayer = Recorder::unbounded();
    subject.clone().subscribe(quitter.clone());
    subject.clone().subscribe(stayer.clone());

    subject.send(1);
    subject.send(2);
    assert_eq!(quitter.values(), vec![1]);
    assert_eq!(stayer.values(), vec![1, 2]);
    assert_eq!(subject.subscriber_count(), 1);
  }

  #[test]
  fn reentrant_send_keeps_order() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
    let echo = subject.clone();
    let s = seen.clone();
    let _a = subject.clone().sink(move |v| {
      s.borrow_mut().push(("a", v));
      if v == 1 {
        echo.send(2);
      }
    });
    let s = seen.clone();
    let _b = subject.clone().sink(move |v| s.borrow_mut().push(("b", v)));

    subject.send(1);
    assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]);
  }

  #[test]
  fn relays_an_upstream_publisher() {
    let subject = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().subscribe(recorder.clone());
    from_iter(1..=3).subscribe(subject.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
