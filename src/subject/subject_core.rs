use std::{collections::VecDeque, rc::Rc};

use smallvec::SmallVec;

use crate::{
  demand::Demand,
  rc::{MutRc, RcDeref, RcDerefMut, WeakMutRc},
  subscriber::{BoxedSubscriber, Completion},
  subscription::{Outlet, Overflow, SubscriptionRef, Upstream},
};

/// Attached subscribers, keyed by a registration id.
///
/// Uses `SmallVec<[_; 2]>` so the common case of one or two subscribers
/// never allocates.
pub(crate) struct Subscribers<Item, Err> {
  next_id: usize,
  items: SmallVec<[(usize, Rc<Outlet<Item, Err>>); 2]>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Item: 'static, Err: 'static> Subscribers<Item, Err> {
  #[inline]
  fn add(&mut self, outlet: Rc<Outlet<Item, Err>>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, outlet));
    id
  }

  fn remove(&mut self, id: usize) -> Option<Rc<Outlet<Item, Err>>> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  fn len(&self) -> usize { self.items.len() }

  #[inline]
  fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Outlets a value should go to, taken before any of them is called.
  fn snapshot(&self) -> SmallVec<[Rc<Outlet<Item, Err>>; 2]> {
    self
      .items
      .iter()
      .filter(|(_, outlet)| !outlet.is_closed())
      .map(|(_, outlet)| outlet.clone())
      .collect()
  }

  fn drain(&mut self) -> SmallVec<[Rc<Outlet<Item, Err>>; 2]> {
    self.items.drain(..).map(|(_, outlet)| outlet).collect()
  }
}

enum Signal<Item, Err> {
  Next(Item),
  Complete(Completion<Err>),
}

struct SubjectState<Item, Err> {
  subscribers: Subscribers<Item, Err>,
  completion: Option<Completion<Err>>,
  emitting: bool,
  pending: VecDeque<Signal<Item, Err>>,
  upstream: SmallVec<[SubscriptionRef; 1]>,
  ref_counted: bool,
}

/// Registry and fan-out loop shared by both subject flavours.
///
/// A `send` snapshots the registry before delivering, so subscribers added
/// or removed by a callback take effect from the next value on. Sends issued
/// from inside a callback are queued and delivered, in order, once the
/// running fan-out returns.
pub(crate) struct SubjectCore<Item, Err>(MutRc<SubjectState<Item, Err>>);

impl<Item, Err> Clone for SubjectCore<Item, Err> {
  fn clone(&self) -> Self { SubjectCore(self.0.clone()) }
}

impl<Item, Err> Default for SubjectCore<Item, Err> {
  fn default() -> Self {
    SubjectCore(MutRc::own(SubjectState {
      subscribers: Subscribers::default(),
      completion: None,
      emitting: false,
      pending: VecDeque::new(),
      upstream: SmallVec::new(),
      ref_counted: false,
    }))
  }
}

/// Per-subscriber upstream of an outlet: cancelling it leaves the registry.
struct Detach<Item, Err> {
  core: WeakMutRc<SubjectState<Item, Err>>,
  id: usize,
}

impl<Item, Err> Upstream<Item, Err> for Detach<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn cancel(&mut self) {
    if let Some(state) = self.core.upgrade() {
      SubjectCore(state).remove(self.id);
    }
  }
}

impl<Item, Err> SubjectCore<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub(crate) fn new() -> Self { Self::default() }

  /// Register `subscriber`. `initial` is queued ahead of any live value; a
  /// subscriber arriving after completion only receives the completion.
  pub(crate) fn subscribe(
    &self,
    subscriber: BoxedSubscriber<Item, Err>,
    overflow: Overflow,
    initial: Option<Item>,
  ) {
    let outlet = Outlet::new(overflow);
    let completion = self.0.rc_deref().completion.clone();
    if let Some(completion) = completion {
      outlet.attach(subscriber);
      outlet.complete(completion);
      return;
    }
    if let Some(value) = initial {
      outlet.push(value);
    }
    let id = self.0.rc_deref_mut().subscribers.add(outlet.clone());
    outlet.set_upstream(Detach { core: self.0.downgrade(), id });
    outlet.attach(subscriber);
  }

  pub(crate) fn send(&self, value: Item) {
    {
      let mut state = self.0.rc_deref_mut();
      if state.completion.is_some() {
        tracing::warn!("value sent to a completed subject ignored");
        return;
      }
      if state.emitting {
        state.pending.push_back(Signal::Next(value));
        return;
      }
      state.emitting = true;
    }
    self.emit(Signal::Next(value));
  }

  pub(crate) fn send_completion(&self, completion: Completion<Err>) {
    {
      let mut state = self.0.rc_deref_mut();
      if state.completion.is_some() {
        tracing::warn!("completion sent to a completed subject ignored");
        return;
      }
      state.completion = Some(completion.clone());
      if state.emitting {
        state.pending.push_back(Signal::Complete(completion));
        return;
      }
      state.emitting = true;
    }
    self.emit(Signal::Complete(completion));
  }

  fn emit(&self, mut signal: Signal<Item, Err>) {
    loop {
      match signal {
        Signal::Next(value) => {
          let targets = self.0.rc_deref().subscribers.snapshot();
          let mut iter = targets.iter().peekable();
          while let Some(outlet) = iter.next() {
            if iter.peek().is_some() {
              outlet.push(value.clone());
            } else {
              outlet.push(value);
              break;
            }
          }
        }
        Signal::Complete(completion) => {
          let (targets, upstream) = {
            let mut state = self.0.rc_deref_mut();
            (state.subscribers.drain(), std::mem::take(&mut state.upstream))
          };
          tracing::debug!(
            subscribers = targets.len(),
            failed = completion.is_failure(),
            "subject completed"
          );
          upstream.iter().for_each(|s| s.cancel());
          for outlet in targets {
            outlet.complete(completion.clone());
          }
        }
      }
      let next = {
        let mut state = self.0.rc_deref_mut();
        let next = state.pending.pop_front();
        if next.is_none() {
          state.emitting = false;
        }
        next
      };
      match next {
        Some(next) => signal = next,
        None => break,
      }
    }
  }

  fn remove(&self, id: usize) {
    let idle_upstream = {
      let mut state = self.0.rc_deref_mut();
      if state.subscribers.remove(id).is_none() {
        return;
      }
      if state.ref_counted && state.subscribers.is_empty() && state.completion.is_none() {
        Some(std::mem::take(&mut state.upstream))
      } else {
        None
      }
    };
    if let Some(upstream) = idle_upstream {
      if !upstream.is_empty() {
        tracing::debug!("last subscriber left, disconnecting subject from upstream");
      }
      upstream.iter().for_each(|s| s.cancel());
    }
  }

  /// Keep the subscription of a source this subject subscribed to, and grant
  /// it unbounded demand. Per-subscriber demand is applied at fan-out.
  pub(crate) fn attach_upstream(&self, subscription: SubscriptionRef) {
    let completed = self.0.rc_deref().completion.is_some();
    if completed {
      subscription.cancel();
      return;
    }
    self.0.rc_deref_mut().upstream.push(subscription.clone());
    subscription.request(Demand::Unbounded);
  }

  /// Cancel upstream sources once the last subscriber left.
  pub(crate) fn set_ref_counted(&self) { self.0.rc_deref_mut().ref_counted = true; }

  pub(crate) fn is_connected(&self) -> bool { !self.0.rc_deref().upstream.is_empty() }

  pub(crate) fn is_completed(&self) -> bool { self.0.rc_deref().completion.is_some() }

  pub(crate) fn subscriber_count(&self) -> usize { self.0.rc_deref().subscribers.len() }
}
