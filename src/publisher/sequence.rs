use std::{iter::Peekable, marker::PhantomData};

use crate::{
  error::Never,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Pulled, Upstream},
};

/// Cold publisher walking an iterable from the start for every subscriber.
///
/// Values are pulled lazily, one per unit of demand, so an endless iterator
/// is fine as long as demand stays bounded.
///
/// ```
/// use rxdemand::prelude::*;
///
/// let _sub = from_iter(1..=10)
///   .filter(|v| v % 2 == 0)
///   .sink(|v| println!("{v}"));
/// ```
pub struct Sequence<I, Err = Never> {
  iter: I,
  _p: PhantomData<fn() -> Err>,
}

/// A sequence publisher that cannot fail. Use `set_failure_type` to combine
/// it with failing streams.
pub fn from_iter<I: IntoIterator>(iter: I) -> Sequence<I, Never> { Sequence::new(iter) }

impl<I, Err> Sequence<I, Err> {
  pub fn new(iter: I) -> Self { Sequence { iter, _p: PhantomData } }
}

impl<I: Clone, Err> Clone for Sequence<I, Err> {
  fn clone(&self) -> Self { Sequence::new(self.iter.clone()) }
}

struct IterSource<It: Iterator>(Peekable<It>);

impl<It, Err> Upstream<It::Item, Err> for IterSource<It>
where
  It: Iterator,
{
  fn pull(&mut self) -> Option<Pulled<It::Item, Err>> {
    Some(match self.0.next() {
      Some(value) if self.0.peek().is_none() => Pulled::Last(value),
      Some(value) => Pulled::Next(value),
      None => Pulled::Complete(Completion::Finished),
    })
  }
}

impl<I, Err> Publisher for Sequence<I, Err>
where
  I: IntoIterator,
  I::IntoIter: 'static,
  I::Item: 'static,
  Err: 'static,
{
  type Item = I::Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Self::Item, Self::Err> + 'static,
  {
    let mut iter = self.iter.into_iter().peekable();
    let exhausted = iter.peek().is_none();
    let outlet = Outlet::pull_source(IterSource(iter));
    outlet.attach(Box::new(subscriber));
    if exhausted {
      outlet.complete(Completion::Finished);
    }
  }
}
