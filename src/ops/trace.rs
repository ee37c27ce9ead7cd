use std::{fmt::Debug, rc::Rc};

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, Subscription, SubscriptionRef},
};

/// Logs every signal passing this point at `info` level, tagged with
/// `label`: subscription, demand requests, values, completion and cancel.
#[derive(Clone)]
pub struct TraceOp<S> {
  pub(crate) source: S,
  pub(crate) label: &'static str,
}

pub struct TraceSubscriber<O> {
  observer: O,
  label: &'static str,
}

struct TraceSubscription {
  inner: SubscriptionRef,
  label: &'static str,
}

impl Subscription for TraceSubscription {
  fn request(&self, demand: Demand) {
    tracing::info!(label = self.label, ?demand, "request");
    self.inner.request(demand)
  }

  fn cancel(&self) {
    tracing::info!(label = self.label, "cancel");
    self.inner.cancel()
  }
}

impl<S> Publisher for TraceOp<S>
where
  S: Publisher,
  S::Item: Debug,
  S::Err: Debug,
{
  type Item = S::Item;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(TraceSubscriber { observer: subscriber, label: self.label }))
  }
}

impl<Item, Err, O> Subscriber<Item, Err> for TraceSubscriber<O>
where
  O: Subscriber<Item, Err>,
  Item: Debug,
  Err: Debug,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    tracing::info!(label = self.label, "subscribed");
    self.observer.on_subscribe(Rc::new(TraceSubscription { inner: subscription, label: self.label }))
  }

  fn on_next(&mut self, value: Item) -> Demand {
    tracing::info!(label = self.label, ?value, "value");
    let demand = self.observer.on_next(value);
    if !demand.is_none() {
      tracing::info!(label = self.label, ?demand, "request");
    }
    demand
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    tracing::info!(label = self.label, ?completion, "completion");
    self.observer.on_complete(completion)
  }
}
