//! Recording subscriber shared by the unit tests.

use crate::{
  demand::Demand,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::SubscriptionRef,
};

struct Record<Item, Err> {
  values: Vec<Item>,
  completions: Vec<Completion<Err>>,
  subscription: Option<SubscriptionRef>,
  subscribe_calls: usize,
  initial: Demand,
  per_value: Demand,
  cancel_after: Option<usize>,
}

/// Subscriber that records every signal and lets the test drive demand.
pub(crate) struct Recorder<Item, Err>(MutRc<Record<Item, Err>>);

impl<Item, Err> Clone for Recorder<Item, Err> {
  fn clone(&self) -> Self { Recorder(self.0.clone()) }
}

impl<Item, Err> Recorder<Item, Err> {
  pub(crate) fn with_demand(initial: Demand) -> Self {
    Recorder(MutRc::own(Record {
      values: vec![],
      completions: vec![],
      subscription: None,
      subscribe_calls: 0,
      initial,
      per_value: Demand::NONE,
      cancel_after: None,
    }))
  }

  pub(crate) fn unbounded() -> Self { Self::with_demand(Demand::Unbounded) }

  /// Demand returned from every `on_next`.
  pub(crate) fn returning(self, per_value: Demand) -> Self {
    self.0.rc_deref_mut().per_value = per_value;
    self
  }

  /// Cancel from inside `on_next` once `n` values arrived.
  pub(crate) fn cancel_after(self, n: usize) -> Self {
    self.0.rc_deref_mut().cancel_after = Some(n);
    self
  }

  pub(crate) fn request(&self, demand: Demand) {
    let subscription = self.0.rc_deref().subscription.clone();
    if let Some(subscription) = subscription {
      subscription.request(demand);
    }
  }

  pub(crate) fn cancel(&self) {
    let subscription = self.0.rc_deref().subscription.clone();
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }

  pub(crate) fn subscribe_calls(&self) -> usize { self.0.rc_deref().subscribe_calls }

  pub(crate) fn completion_count(&self) -> usize { self.0.rc_deref().completions.len() }
}

impl<Item: Clone, Err> Recorder<Item, Err> {
  pub(crate) fn values(&self) -> Vec<Item> { self.0.rc_deref().values.clone() }
}

impl<Item, Err: Clone> Recorder<Item, Err> {
  pub(crate) fn completion(&self) -> Option<Completion<Err>> {
    self.0.rc_deref().completions.first().cloned()
  }
}

impl<Item, Err> Subscriber<Item, Err> for Recorder<Item, Err> {
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    let initial = {
      let mut record = self.0.rc_deref_mut();
      record.subscribe_calls += 1;
      record.subscription = Some(subscription.clone());
      record.initial
    };
    subscription.request(initial);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    let (cancel, demand) = {
      let mut record = self.0.rc_deref_mut();
      record.values.push(value);
      let cancel = record.cancel_after == Some(record.values.len());
      (cancel, record.per_value)
    };
    if cancel {
      self.cancel();
      return Demand::NONE;
    }
    demand
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    let mut record = self.0.rc_deref_mut();
    record.completions.push(completion);
    record.subscription = None;
  }
}
