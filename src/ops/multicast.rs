//! Connectable multicasting.
//!
//! [`Multicast`] routes one upstream subscription through a subject to any
//! number of subscribers. Subscribing only registers with the subject; the
//! upstream starts once [`Multicast::connect`] is called, so subscribers
//! attached before that all observe the same values.
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let shared = from_iter(1..=3).multicast(PassthroughSubject::new());
//! let _a = shared.clone().sink(|v| println!("a: {v}"));
//! let _b = shared.clone().sink(|v| println!("b: {v}"));
//! let _connection = shared.connect();
//! ```

use std::marker::PhantomData;

use crate::{
  demand::Demand,
  publisher::Publisher,
  rc::{MutRc, RcDerefMut},
  subject::Subject,
  subscriber::{Completion, Subscriber},
  subscription::{AnyCancellable, EmptySubscription, SubscriptionRef, UpstreamSlot},
};

pub struct Multicast<P, Sub> {
  source: MutRc<Option<P>>,
  subject: Sub,
}

impl<P, Sub: Clone> Clone for Multicast<P, Sub> {
  fn clone(&self) -> Self { Multicast { source: self.source.clone(), subject: self.subject.clone() } }
}

impl<P, Sub> Multicast<P, Sub>
where
  P: Publisher,
  Sub: Subject<Item = P::Item, Err = P::Err>,
{
  pub(crate) fn new(source: P, subject: Sub) -> Self { Multicast { source: MutRc::own(Some(source)), subject } }

  /// Subscribe the subject to the upstream. Cancelling the returned handle
  /// disconnects the upstream; subscribers stay registered with the subject.
  ///
  /// Only the first call connects. Later calls, including those made after
  /// the upstream completed, return an inert handle and replay nothing.
  pub fn connect(&self) -> AnyCancellable {
    let source = self.source.rc_deref_mut().take();
    let Some(source) = source else {
      tracing::debug!("multicast already connected");
      return AnyCancellable::new(EmptySubscription::shared());
    };
    let slot = UpstreamSlot::new();
    let connection = AnyCancellable::from_slot(slot.clone());
    source.subscribe(Connection { slot, subject: self.subject.clone(), _p: PhantomData });
    connection
  }
}

impl<P, Sub> Publisher for Multicast<P, Sub>
where
  P: Publisher,
  Sub: Subject<Item = P::Item, Err = P::Err>,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<P::Item, P::Err> + 'static,
  {
    self.subject.subscribe(subscriber)
  }
}

/// Feeds a subject from the upstream with unbounded demand; each subscriber's
/// own demand applies at the subject.
struct Connection<Sub, Item, Err> {
  slot: UpstreamSlot,
  subject: Sub,
  _p: PhantomData<fn(Item, Err)>,
}

impl<Sub, Item, Err> Subscriber<Item, Err> for Connection<Sub, Item, Err>
where
  Sub: Subject<Item = Item, Err = Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.slot.attach(subscription);
    self.slot.request(Demand::Unbounded);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    self.subject.send(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.slot.release();
    self.subject.send_completion(completion);
  }
}
