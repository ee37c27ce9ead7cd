use crate::{
  demand::Demand,
  rc::{MutRc, RcDerefMut},
  subscription::SubscriptionRef,
};

#[derive(Default)]
struct SlotState {
  subscription: Option<SubscriptionRef>,
  pending: Demand,
  closed: bool,
}

/// Holder for an upstream subscription that may not have arrived yet.
///
/// Demand requested before the upstream `on_subscribe` is accumulated and
/// forwarded on attach; a cancel before attach cancels the late subscription
/// as soon as it shows up. A second attach is a protocol breach and the extra
/// subscription is cancelled.
#[derive(Clone, Default)]
pub(crate) struct UpstreamSlot(MutRc<SlotState>);

impl UpstreamSlot {
  pub(crate) fn new() -> Self { Self::default() }

  pub(crate) fn attach(&self, subscription: SubscriptionRef) {
    let pending = {
      let mut state = self.0.rc_deref_mut();
      if state.closed || state.subscription.is_some() {
        None
      } else {
        state.subscription = Some(subscription.clone());
        Some(std::mem::take(&mut state.pending))
      }
    };
    match pending {
      None => subscription.cancel(),
      Some(pending) if !pending.is_none() => subscription.request(pending),
      Some(_) => {}
    }
  }

  pub(crate) fn request(&self, demand: Demand) {
    if demand.is_none() {
      return;
    }
    let subscription = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        return;
      }
      match &state.subscription {
        Some(s) => s.clone(),
        None => {
          state.pending += demand;
          return;
        }
      }
    };
    subscription.request(demand);
  }

  pub(crate) fn cancel(&self) {
    let subscription = {
      let mut state = self.0.rc_deref_mut();
      state.closed = true;
      state.pending = Demand::NONE;
      state.subscription.take()
    };
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }

  /// The upstream terminated on its own; forget it without cancelling.
  pub(crate) fn release(&self) {
    let mut state = self.0.rc_deref_mut();
    state.closed = true;
    state.subscription = None;
  }
}
