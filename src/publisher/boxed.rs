use std::rc::Rc;

use crate::{
  publisher::Publisher,
  subscriber::{BoxedSubscriber, Subscriber},
};

/// Object-safe mirror of [`Publisher`], subscribing a clone of the erased
/// publisher for each subscriber.
trait DynPublisher<Item, Err> {
  fn box_subscribe(&self, subscriber: BoxedSubscriber<Item, Err>);
}

impl<P> DynPublisher<P::Item, P::Err> for P
where
  P: Publisher + Clone,
{
  fn box_subscribe(&self, subscriber: BoxedSubscriber<P::Item, P::Err>) {
    self.clone().subscribe(subscriber)
  }
}

/// A publisher with its concrete operator chain erased.
///
/// Use it to store or return heterogeneous chains behind one type, for
/// example a collaborator's `fetch() -> AnyPublisher<Posts, RxError>`.
pub struct AnyPublisher<Item, Err>(Rc<dyn DynPublisher<Item, Err>>);

impl<Item, Err> AnyPublisher<Item, Err> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Item = Item, Err = Err> + Clone + 'static,
  {
    AnyPublisher(Rc::new(publisher))
  }
}

impl<Item, Err> Clone for AnyPublisher<Item, Err> {
  fn clone(&self) -> Self { AnyPublisher(self.0.clone()) }
}

impl<Item: 'static, Err: 'static> Publisher for AnyPublisher<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<Item, Err> + 'static,
  {
    self.0.box_subscribe(Box::new(subscriber))
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  fn evens(flag: bool) -> AnyPublisher<i32, Never> {
    if flag {
      from_iter(0..6).filter(|v| v % 2 == 0).erase()
    } else {
      just(0).erase()
    }
  }

  #[test]
  fn heterogeneous_chains_share_a_type() {
    let a = Recorder::unbounded();
    let b = Recorder::unbounded();
    evens(true).subscribe(a.clone());
    evens(false).subscribe(b.clone());
    assert_eq!(a.values(), vec![0, 2, 4]);
    assert_eq!(b.values(), vec![0]);
  }

  #[test]
  fn erased_cold_publisher_replays() {
    let source = from_iter(1..=2).map(|v| v * 10).erase();
    let first = Recorder::unbounded();
    let second = Recorder::unbounded();
    source.clone().subscribe(first.clone());
    source.subscribe(second.clone());
    assert_eq!(first.values(), second.values());
  }
}
