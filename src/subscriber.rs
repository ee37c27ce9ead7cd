//! Subscriber trait: the consumer side of the protocol.
//!
//! A subscriber receives exactly one subscription handle, then values as far
//! as its demand allows, then at most one terminal completion.

use crate::{demand::Demand, subscription::SubscriptionRef};

/// Terminal signal of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<Err> {
  Finished,
  Failed(Err),
}

impl<Err> Completion<Err> {
  #[inline]
  pub fn is_failure(&self) -> bool { matches!(self, Completion::Failed(_)) }

  /// Transform the failure, keeping `Finished` as is.
  pub fn map_err<E2>(self, f: impl FnOnce(Err) -> E2) -> Completion<E2> {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failed(err) => Completion::Failed(f(err)),
    }
  }
}

pub trait Subscriber<Item, Err> {
  /// Called once, before any value. Request demand here to start the flow.
  fn on_subscribe(&mut self, subscription: SubscriptionRef);

  /// Receive a value. The returned demand is added to what is outstanding:
  /// `Demand::NONE` keeps the current grant, anything more front-loads.
  fn on_next(&mut self, value: Item) -> Demand;

  /// Terminal signal; nothing follows it.
  fn on_complete(&mut self, completion: Completion<Err>);
}

/// Type-erased subscriber, used wherever a node stores a downstream of a
/// type it cannot name (subjects, multi-source combinators, erased
/// publishers).
pub type BoxedSubscriber<Item, Err> = Box<dyn Subscriber<Item, Err>>;

impl<Item, Err> Subscriber<Item, Err> for BoxedSubscriber<Item, Err> {
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { (**self).on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { (**self).on_next(value) }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { (**self).on_complete(completion) }
}
