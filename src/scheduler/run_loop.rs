use std::time::Instant;

use futures::{executor::LocalSpawner, task::LocalSpawnExt};

use super::{Duration, Scheduler, Task, TaskHandle};

/// Serial executor bound to a `futures` `LocalPool`.
///
/// Tasks run when the pool is driven (`run`, `run_until_stalled`), one after
/// another on the pool's thread. Delays are `futures-time` timers.
///
/// ```rust
/// use futures::executor::LocalPool;
/// use rxdemand::prelude::*;
///
/// let mut pool = LocalPool::new();
/// let scheduler = RunLoopScheduler::new(pool.spawner());
/// scheduler.schedule_after(Duration::from_millis(1), || println!("tick"));
/// pool.run();
/// ```
#[derive(Clone)]
pub struct RunLoopScheduler {
  spawner: LocalSpawner,
  epoch: Instant,
}

impl RunLoopScheduler {
  pub fn new(spawner: LocalSpawner) -> Self { RunLoopScheduler { spawner, epoch: Instant::now() } }
}

impl Scheduler for RunLoopScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule_task(&self, delay: Duration, task: Task, handle: TaskHandle) {
    let fut = async move {
      if !delay.is_zero() {
        futures_time::task::sleep(delay.into()).await;
      }
      if !handle.is_cancelled() {
        task();
      }
    };
    if let Err(err) = self.spawner.spawn_local(fut) {
      tracing::warn!(error = %err, "run loop is shut down, task dropped");
    }
  }
}
