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

/// Delivers values and completion to the downstream through `scheduler`.
///
/// Demand still flows upstream synchronously. Signals keep their order as
/// long as the scheduler runs tasks in submission order.
#[derive(Clone)]
pub struct ReceiveOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

type Pending = MutRc<Vec<TaskHandle>>;

pub struct ReceiveOnSubscriber<Item, Err, SD> {
  relay: Relay<Item, Err>,
  scheduler: SD,
  pending: Pending,
}

/// Cancelling also drops every delivery still waiting on the scheduler.
struct ReceiveOnUpstream {
  slot: UpstreamSlot,
  pending: Pending,
}

impl<Item, Err> Upstream<Item, Err> for ReceiveOnUpstream {
  fn request(&mut self, demand: Demand) { self.slot.request(demand) }

  fn cancel(&mut self) {
    let pending = std::mem::take(&mut *self.pending.rc_deref_mut());
    pending.iter().for_each(TaskHandle::cancel);
    self.slot.cancel();
  }
}

impl<Item: 'static, Err: 'static, SD: Scheduler> ReceiveOnSubscriber<Item, Err, SD> {
  /// A task cancels its own handle when it runs, which marks it done.
  fn deliver(&self, task: impl FnOnce() + 'static) {
    let handle = TaskHandle::new();
    let done = handle.clone();
    self.pending.rc_deref_mut().push(handle.clone());
    self.scheduler.schedule_task(
      Duration::ZERO,
      Box::new(move || {
        done.cancel();
        task();
      }),
      handle,
    );
    self.pending.rc_deref_mut().retain(|handle| !handle.is_cancelled());
  }
}

impl<S, SD> Publisher for ReceiveOnOp<S, SD>
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
    let relay = Relay::new();
    let pending = MutRc::own(vec![]);
    relay.outlet.set_upstream(ReceiveOnUpstream { slot: relay.slot.clone(), pending: pending.clone() });
    relay.attach(Box::new(subscriber));
    self.source.subscribe(ReceiveOnSubscriber { relay, scheduler: self.scheduler, pending });
  }
}

impl<Item, Err, SD> Subscriber<Item, Err> for ReceiveOnSubscriber<Item, Err, SD>
where
  Item: 'static,
  Err: 'static,
  SD: Scheduler,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.relay.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    let outlet = self.relay.outlet.clone();
    self.deliver(move || {
      outlet.push(value);
    });
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.relay.slot.release();
    let outlet = self.relay.outlet.clone();
    self.deliver(move || outlet.complete(completion));
  }
}
