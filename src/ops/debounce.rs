use std::time::Duration;

use super::relay::Relay;
use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDerefMut},
  scheduler::{Scheduler, TaskHandle},
  subscriber::{Completion, Subscriber},
  subscription::{SubscriptionRef, Upstream, UpstreamSlot},
};

/// Emits a value only after `duration` passed without a newer one.
///
/// The pending value is flushed when the upstream finishes and dropped when
/// it fails.
#[derive(Clone)]
pub struct DebounceOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
  pub(crate) duration: Duration,
}

type Timer = MutRc<Option<TaskHandle>>;

pub struct DebounceSubscriber<Item, Err, SD> {
  relay: Relay<Item, Err>,
  scheduler: SD,
  delay: Duration,
  trailing_value: MutRc<Option<Item>>,
  timer: Timer,
}

/// Cancelling stops the pending emission as well as the upstream.
struct DebounceUpstream {
  slot: UpstreamSlot,
  timer: Timer,
}

impl<Item, Err> Upstream<Item, Err> for DebounceUpstream {
  fn request(&mut self, _: Demand) {}

  fn cancel(&mut self) {
    cancel_timer(&self.timer);
    self.slot.cancel();
  }
}

fn cancel_timer(timer: &Timer) {
  if let Some(handle) = timer.rc_deref_mut().take() {
    handle.cancel();
  }
}

impl<S, SD> Publisher for DebounceOp<S, SD>
where
  S: Publisher,
  SD: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    let Self { source, scheduler, duration } = self;
    let relay = Relay::new();
    let timer = MutRc::own(None);
    relay.outlet.set_upstream(DebounceUpstream { slot: relay.slot.clone(), timer: timer.clone() });
    relay.attach(Box::new(subscriber));
    source.subscribe(DebounceSubscriber {
      relay,
      scheduler,
      delay: duration,
      trailing_value: MutRc::own(None),
      timer,
    });
  }
}

impl<Item, Err, SD> Subscriber<Item, Err> for DebounceSubscriber<Item, Err, SD>
where
  Item: 'static,
  Err: 'static,
  SD: Scheduler,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.relay.on_subscribe(subscription);
    self.relay.slot.request(Demand::Unbounded);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    *self.trailing_value.rc_deref_mut() = Some(value);
    cancel_timer(&self.timer);
    let outlet = self.relay.outlet.clone();
    let trailing = self.trailing_value.clone();
    let handle = self.scheduler.schedule_after(self.delay, move || {
      let value = trailing.rc_deref_mut().take();
      if let Some(value) = value {
        outlet.push(value);
      }
    });
    *self.timer.rc_deref_mut() = Some(handle);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    cancel_timer(&self.timer);
    let trailing = self.trailing_value.rc_deref_mut().take();
    if let (Completion::Finished, Some(value)) = (&completion, trailing) {
      self.relay.push(value);
    }
    self.relay.finish(completion);
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn only_the_quiet_value_is_emitted() {
    let scheduler = TestScheduler::new();
    let subject = PassthroughSubject::<&str, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().debounce(Duration::from_millis(500), scheduler.clone()).subscribe(recorder.clone());

    subject.send("S");
    scheduler.advance_by(Duration::from_millis(100));
    subject.send("Sw");
    scheduler.advance_by(Duration::from_millis(100));
    subject.send("Swift");
    scheduler.advance_by(Duration::from_millis(600));
    subject.send("Swift U");
    scheduler.advance_by(Duration::from_millis(100));
    subject.send("Swift UI");
    scheduler.advance_by(Duration::from_millis(600));

    assert_eq!(recorder.values(), vec!["Swift", "Swift UI"]);
  }

  #[test]
  fn finish_flushes_pending_value() {
    let scheduler = TestScheduler::new();
    let subject = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().debounce(Duration::from_millis(10), scheduler.clone()).subscribe(recorder.clone());
    subject.send(1);
    subject.send(2);
    subject.send_completion(Completion::Finished);
    assert_eq!(recorder.values(), vec![2]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn failure_drops_pending_value() {
    let scheduler = TestScheduler::new();
    let subject = PassthroughSubject::<i32, &'static str>::new();
    let recorder = Recorder::unbounded();
    subject.clone().debounce(Duration::from_millis(10), scheduler.clone()).subscribe(recorder.clone());
    subject.send(1);
    subject.send_completion(Completion::Failed("io"));
    scheduler.flush();
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Failed("io")));
  }

  #[test]
  fn cancel_stops_the_timer() {
    let scheduler = TestScheduler::new();
    let subject = PassthroughSubject::<i32, Never>::new();
    let recorder = Recorder::unbounded();
    subject.clone().debounce(Duration::from_millis(10), scheduler.clone()).subscribe(recorder.clone());
    subject.send(1);
    recorder.cancel();
    scheduler.flush();
    assert!(recorder.values().is_empty());
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn empty_source_finishes_without_values() {
    let recorder = Recorder::<i32, Never>::unbounded();
    empty().debounce(Duration::from_millis(10), TestScheduler::new()).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }
}
