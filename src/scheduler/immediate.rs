use std::time::Instant;

use super::{Duration, Scheduler, Task, TaskHandle};

/// Runs every task inline, on the calling stack, ignoring delays.
///
/// Useful to satisfy a scheduler parameter without introducing asynchrony:
/// `receive_on(ImmediateScheduler::new())` delivers synchronously. A
/// repeating task runs once, there is no time to repeat it in.
#[derive(Clone, Copy, Debug)]
pub struct ImmediateScheduler {
  epoch: Instant,
}

impl ImmediateScheduler {
  pub fn new() -> Self { ImmediateScheduler { epoch: Instant::now() } }
}

impl Default for ImmediateScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule_task(&self, _delay: Duration, task: Task, handle: TaskHandle) {
    if !handle.is_cancelled() {
      task();
    }
  }

  fn schedule_repeating(&self, _period: Duration, mut task: impl FnMut() + 'static) -> TaskHandle {
    task();
    TaskHandle::new()
  }
}
