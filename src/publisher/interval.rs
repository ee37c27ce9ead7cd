use std::rc::Rc;

use crate::{
  error::Never,
  publisher::Publisher,
  scheduler::{Duration, Scheduler, TaskHandle},
  subscriber::Subscriber,
  subscription::{Outlet, Overflow, Upstream},
};

/// Emits the tick index (`0, 1, 2, ...`) every `period` on `scheduler`.
///
/// Interval is a timer: it never buffers. A tick that finds no outstanding
/// demand is dropped, and the index keeps counting. The repeating task is
/// cancelled together with the subscription.
#[derive(Clone)]
pub struct Interval<SD> {
  period: Duration,
  scheduler: SD,
}

pub fn interval<SD: Scheduler>(period: Duration, scheduler: SD) -> Interval<SD> {
  Interval { period, scheduler }
}

struct Ticker(TaskHandle);

impl Upstream<u64, Never> for Ticker {
  fn cancel(&mut self) {
    tracing::trace!("interval cancelled");
    self.0.cancel();
  }
}

impl<SD: Scheduler> Publisher for Interval<SD> {
  type Item = u64;
  type Err = Never;

  fn subscribe<S>(self, subscriber: S)
  where
    S: Subscriber<u64, Never> + 'static,
  {
    let outlet = Outlet::new(Overflow::Drop);
    outlet.attach(Box::new(subscriber));
    if outlet.is_closed() {
      return;
    }

    let weak = Rc::downgrade(&outlet);
    let mut index = 0u64;
    let handle = self.scheduler.schedule_repeating(self.period, move || {
      if let Some(outlet) = weak.upgrade() {
        outlet.push(index);
      }
      index += 1;
    });
    if outlet.is_closed() {
      handle.cancel();
    } else {
      outlet.set_upstream(Ticker(handle));
    }
  }
}
