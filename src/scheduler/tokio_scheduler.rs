use std::time::Instant;

use super::{Duration, Scheduler, Task, TaskHandle};

/// Schedules on the current tokio `LocalSet` through `spawn_local`.
///
/// Must be used from inside a `LocalSet` context; tasks are `!Send`.
#[derive(Clone, Copy, Debug)]
pub struct TokioLocalScheduler {
  epoch: Instant,
}

impl TokioLocalScheduler {
  pub fn new() -> Self { TokioLocalScheduler { epoch: Instant::now() } }
}

impl Default for TokioLocalScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for TokioLocalScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule_task(&self, delay: Duration, task: Task, handle: TaskHandle) {
    tokio::task::spawn_local(async move {
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      if !handle.is_cancelled() {
        task();
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[tokio::test]
  async fn runs_inside_local_set() {
    let local = tokio::task::LocalSet::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    local
      .run_until(async move {
        let scheduler = TokioLocalScheduler::new();
        let late = s.clone();
        scheduler.schedule_after(Duration::from_millis(10), move || late.borrow_mut().push(2));
        scheduler.schedule(move || s.borrow_mut().push(1));
        tokio::time::sleep(Duration::from_millis(30)).await;
      })
      .await;
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }
}
