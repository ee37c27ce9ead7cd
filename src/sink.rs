//! Closure-based terminal subscribers.
//!
//! A sink requests unbounded demand and hands back an [`AnyCancellable`];
//! the stream runs for as long as that handle is alive.

use crate::{
  demand::Demand,
  error::{protocol_violation, RxError},
  subscriber::{Completion, Subscriber},
  subscription::{AnyCancellable, SubscriptionRef, UpstreamSlot},
};

pub struct Sink<N, C> {
  on_value: N,
  on_completion: Option<C>,
  slot: UpstreamSlot,
  subscribed: bool,
}

impl<N, C> Sink<N, C> {
  pub fn new(on_value: N, on_completion: C) -> Self {
    Sink { on_value, on_completion: Some(on_completion), slot: UpstreamSlot::new(), subscribed: false }
  }

  /// The cancel-on-drop handle controlling this sink's subscription.
  pub fn cancellable(&self) -> AnyCancellable { AnyCancellable::from_slot(self.slot.clone()) }
}

impl<Item, Err, N, C> Subscriber<Item, Err> for Sink<N, C>
where
  N: FnMut(Item),
  C: FnOnce(Completion<Err>),
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    if self.subscribed {
      protocol_violation(RxError::ProtocolViolation("sink subscribed twice"));
      subscription.cancel();
      return;
    }
    self.subscribed = true;
    self.slot.attach(subscription);
    self.slot.request(Demand::Unbounded);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.on_completion.is_none() {
      protocol_violation(RxError::ProtocolViolation("value delivered after completion"));
      return Demand::NONE;
    }
    (self.on_value)(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    match self.on_completion.take() {
      Some(on_completion) => {
        self.slot.release();
        on_completion(completion);
      }
      None => protocol_violation(RxError::ProtocolViolation("completion delivered twice")),
    }
  }
}
