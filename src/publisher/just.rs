use std::marker::PhantomData;

use crate::{
  error::Never,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, Pulled, Upstream},
};

/// Emits one value once it is demanded, then finishes.
#[derive(Clone, Debug)]
pub struct Just<T>(pub T);

pub fn just<T>(value: T) -> Just<T> { Just(value) }

struct JustSource<T>(Option<T>);

impl<T> Upstream<T, Never> for JustSource<T> {
  fn pull(&mut self) -> Option<Pulled<T, Never>> {
    Some(match self.0.take() {
      Some(value) => Pulled::Last(value),
      None => Pulled::Complete(Completion::Finished),
    })
  }
}

impl<T: 'static> Publisher for Just<T> {
  type Item = T;
  type Err = Never;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<T, Never> + 'static,
  {
    Outlet::pull_source(JustSource(Some(self.0))).attach(Box::new(subscriber));
  }
}

/// Finishes right away without emitting.
pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { empty() }
}

impl<Item: 'static, Err: 'static> Publisher for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    let outlet = Outlet::new(Overflow::Buffer);
    outlet.attach(Box::new(subscriber));
    outlet.complete(Completion::Finished);
  }
}

/// Fails right away with the given error.
pub struct Fail<Item, Err> {
  err: Err,
  _p: PhantomData<fn() -> Item>,
}

pub fn fail<Item, Err>(err: Err) -> Fail<Item, Err> { Fail { err, _p: PhantomData } }

impl<Item, Err: Clone> Clone for Fail<Item, Err> {
  fn clone(&self) -> Self { fail(self.err.clone()) }
}

impl<Item: 'static, Err: 'static> Publisher for Fail<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    let outlet = Outlet::new(Overflow::Buffer);
    outlet.attach(Box::new(subscriber));
    outlet.complete(Completion::Failed(self.err));
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn just_waits_for_demand() {
    let recorder = Recorder::with_demand(Demand::NONE);
    just(7).subscribe(recorder.clone());
    assert!(recorder.values().is_empty());
    assert!(recorder.completion().is_none());
    recorder.request(Demand::max(1));
    assert_eq!(recorder.values(), vec![7]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn empty_finishes_without_demand() {
    let recorder = Recorder::<i32, Never>::with_demand(Demand::NONE);
    empty().subscribe(recorder.clone());
    assert_eq!(recorder.subscribe_calls(), 1);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn fail_reports_error_once() {
    let recorder = Recorder::<i32, _>::unbounded();
    fail(RxError::producer("offline")).subscribe(recorder.clone());
    assert_eq!(recorder.completion(), Some(Completion::Failed(RxError::producer("offline"))));
    assert_eq!(recorder.completion_count(), 1);
  }
}
