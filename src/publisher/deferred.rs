use crate::{publisher::Publisher, subscriber::Subscriber};

/// Builds its publisher only when subscribed, once per subscriber.
///
/// This is how a collaborator such as an HTTP client exposes a cold,
/// lazily started request: nothing runs until someone subscribes.
#[derive(Clone)]
pub struct Deferred<F>(F);

pub fn deferred<F, P>(factory: F) -> Deferred<F>
where
  F: FnOnce() -> P,
  P: Publisher,
{
  Deferred(factory)
}

impl<F, P> Publisher for Deferred<F>
where
  F: FnOnce() -> P,
  P: Publisher,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static,
  {
    (self.0)().subscribe(subscriber)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn factory_runs_per_subscription() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let source = deferred(move || {
      c.set(c.get() + 1);
      just(c.get())
    });
    assert_eq!(calls.get(), 0);

    let first = Recorder::unbounded();
    source.clone().subscribe(first.clone());
    let second = Recorder::unbounded();
    source.subscribe(second.clone());

    assert_eq!(first.values(), vec![1]);
    assert_eq!(second.values(), vec![2]);
  }
}
