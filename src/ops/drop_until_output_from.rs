use std::{cell::Cell, rc::Rc};

use super::relay::Relay;
use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{SubscriptionRef, Upstream, UpstreamSlot},
};

/// Ignores upstream values until `trigger` emits its first value.
///
/// A trigger that finishes without emitting leaves the gate shut for good; a
/// trigger failure fails the stream.
#[derive(Clone)]
pub struct DropUntilOutputFromOp<S, T> {
  pub(crate) source: S,
  pub(crate) trigger: T,
}

pub struct DropUntilSubscriber<Item, Err> {
  relay: Relay<Item, Err>,
  open: Rc<Cell<bool>>,
}

struct TriggerSubscriber<Item, Err> {
  relay: Relay<Item, Err>,
  open: Rc<Cell<bool>>,
  slot: UpstreamSlot,
}

/// Cancels the trigger along with the main upstream.
struct Gated {
  main: UpstreamSlot,
  trigger: UpstreamSlot,
}

impl<Item, Err> Upstream<Item, Err> for Gated {
  fn request(&mut self, demand: Demand) { self.main.request(demand) }

  fn cancel(&mut self) {
    self.trigger.cancel();
    self.main.cancel();
  }
}

impl<S, T> Publisher for DropUntilOutputFromOp<S, T>
where
  S: Publisher,
  T: Publisher<Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    let relay = Relay::new();
    let trigger_slot = UpstreamSlot::new();
    relay.outlet.set_upstream(Gated { main: relay.slot.clone(), trigger: trigger_slot.clone() });
    let open = Rc::new(Cell::new(false));
    relay.attach(Box::new(subscriber));
    self.trigger.subscribe(TriggerSubscriber { relay: relay.clone(), open: open.clone(), slot: trigger_slot });
    self.source.subscribe(DropUntilSubscriber { relay, open });
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for DropUntilSubscriber<Item, Err> {
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.relay.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.open.get() {
      self.relay.push(value);
      Demand::NONE
    } else {
      Demand::max(1)
    }
  }

  fn on_complete(&mut self, completion: Completion<Err>) { self.relay.finish(completion) }
}

impl<Item, Out, Err> Subscriber<Item, Err> for TriggerSubscriber<Out, Err>
where
  Out: 'static,
  Err: 'static,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.slot.attach(subscription);
    self.slot.request(Demand::max(1));
  }

  fn on_next(&mut self, _: Item) -> Demand {
    if !self.open.replace(true) {
      tracing::trace!("trigger emitted, gate open");
      self.slot.cancel();
    }
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.slot.release();
    if let Completion::Failed(err) = completion {
      self.relay.abort(Completion::Failed(err));
    }
  }
}
