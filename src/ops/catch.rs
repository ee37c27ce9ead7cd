use std::{marker::PhantomData, rc::Rc};

use super::relay::Relay;
use crate::{
  demand::Demand,
  error::Never,
  publisher::Publisher,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::{Completion, Subscriber},
  subscription::{Outlet, Overflow, SubscriptionRef, Upstream, UpstreamSlot},
};

/// On failure, continues with the publisher `handler` builds from the
/// error. Demand not yet filled by the failed upstream carries over.
#[derive(Clone)]
pub struct CatchOp<S, F> {
  pub(crate) source: S,
  pub(crate) handler: F,
}

/// On failure, emits `value` and finishes. The result can no longer fail.
#[derive(Clone)]
pub struct ReplaceErrorOp<S, Item> {
  pub(crate) source: S,
  pub(crate) value: Item,
}

/// Outlet upstream that follows whichever source is current.
struct Current(MutRc<UpstreamSlot>);

impl<Item, Err> Upstream<Item, Err> for Current {
  fn request(&mut self, demand: Demand) {
    let slot = self.0.rc_deref().clone();
    slot.request(demand)
  }

  fn cancel(&mut self) {
    let slot = self.0.rc_deref().clone();
    slot.cancel()
  }
}

pub struct CatchSubscriber<F, Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  current: MutRc<UpstreamSlot>,
  handler: Option<F>,
}

struct ReplacementSubscriber<Item, Err> {
  outlet: Rc<Outlet<Item, Err>>,
  slot: UpstreamSlot,
}

impl<S, F, P> Publisher for CatchOp<S, F>
where
  S: Publisher,
  F: FnOnce(S::Err) -> P + 'static,
  P: Publisher<Item = S::Item>,
{
  type Item = S::Item;
  type Err = P::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<S::Item, P::Err> + 'static,
  {
    let outlet = Outlet::new(Overflow::Buffer);
    let current = MutRc::own(UpstreamSlot::new());
    outlet.set_upstream(Current(current.clone()));
    outlet.attach(Box::new(subscriber));
    self.source.subscribe(CatchSubscriber { outlet, current, handler: Some(self.handler) })
  }
}

impl<Item, E, E2, F, P> Subscriber<Item, E> for CatchSubscriber<F, Item, E2>
where
  Item: 'static,
  E2: 'static,
  F: FnOnce(E) -> P,
  P: Publisher<Item = Item, Err = E2>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    let slot = self.current.rc_deref().clone();
    slot.attach(subscription)
  }

  fn on_next(&mut self, value: Item) -> Demand {
    self.outlet.push(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<E>) {
    let failed = self.current.rc_deref().clone();
    failed.release();
    let err = match completion {
      Completion::Finished => return self.outlet.complete(Completion::Finished),
      Completion::Failed(err) => err,
    };
    let Some(handler) = self.handler.take() else {
      return;
    };
    if self.outlet.is_closed() {
      return;
    }
    tracing::debug!("upstream failed, switching to the replacement publisher");
    let slot = UpstreamSlot::new();
    slot.request(self.outlet.unfilled_demand());
    *self.current.rc_deref_mut() = slot.clone();
    handler(err).subscribe(ReplacementSubscriber { outlet: self.outlet.clone(), slot });
  }
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> for ReplacementSubscriber<Item, Err> {
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.slot.attach(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.outlet.push(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.slot.release();
    self.outlet.complete(completion)
  }
}

pub struct ReplaceErrorSubscriber<Item, Err> {
  relay: Relay<Item, Never>,
  value: Option<Item>,
  _p: PhantomData<fn(Err)>,
}

impl<S, Item> Publisher for ReplaceErrorOp<S, Item>
where
  S: Publisher<Item = Item>,
  Item: 'static,
{
  type Item = Item;
  type Err = Never;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<Item, Never> + 'static,
  {
    let relay = Relay::new();
    relay.attach(Box::new(subscriber));
    self.source.subscribe(ReplaceErrorSubscriber::<Item, S::Err> {
      relay,
      value: Some(self.value),
      _p: PhantomData,
    })
  }
}

impl<Item: 'static, Err> Subscriber<Item, Err> for ReplaceErrorSubscriber<Item, Err> {
  #[inline]
  fn on_subscribe(&mut self, subscription: SubscriptionRef) { self.relay.on_subscribe(subscription) }

  fn on_next(&mut self, value: Item) -> Demand {
    self.relay.push(value);
    Demand::NONE
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if let (Completion::Failed(_), Some(value)) = (&completion, self.value.take()) {
      self.relay.push(value);
    }
    self.relay.finish(Completion::Finished);
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, test_util::Recorder};

  #[test]
  fn replace_error_emits_then_finishes() {
    let recorder = Recorder::unbounded();
    let subject = PassthroughSubject::<i32, &'static str>::new();
    subject.clone().replace_error(-1).subscribe(recorder.clone());
    subject.send(1);
    subject.send_completion(Completion::Failed("decode"));
    assert_eq!(recorder.values(), vec![1, -1]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn catch_switches_to_replacement() {
    let recorder = Recorder::unbounded();
    from_iter(1..=2)
      .set_failure_type::<RxError>()
      .try_map(|v| if v < 2 { Ok(v) } else { Err(RxError::producer("two")) })
      .catch(|_| from_iter([10, 20]))
      .subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 10, 20]);
    assert_eq!(recorder.completion(), Some(Completion::Finished));
  }

  #[test]
  fn catch_carries_unfilled_demand() {
    let recorder = Recorder::with_demand(Demand::max(3));
    fail::<i32, _>("gone").catch(|_| from_iter(1..=10)).subscribe(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert!(recorder.completion().is_none());
    recorder.request(Demand::max(1));
    assert_eq!(recorder.values(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn replacement_failure_is_delivered() {
    let recorder = Recorder::<i32, _>::unbounded();
    fail::<i32, _>(1).catch(|e| fail(e + 1)).subscribe(recorder.clone());
    assert_eq!(recorder.completion(), Some(Completion::Failed(2)));
  }
}
