//! Virtual-time scheduler for deterministic tests of time-based operators.
//!
//! Time only moves when the test says so. Due tasks run synchronously, in
//! order of their scheduled time and FIFO among tasks due at the same time.
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let subject = PassthroughSubject::<i32, Never>::new();
//! let mut seen = vec![];
//! let _sub = subject
//!   .clone()
//!   .debounce(Duration::from_millis(100), scheduler.clone())
//!   .sink(move |v| seen.push(v));
//!
//! subject.send(1);
//! scheduler.advance_by(Duration::from_millis(100));
//! ```

use std::{cmp::Ordering, collections::BinaryHeap};

use super::{Duration, Scheduler, Task, TaskHandle};
use crate::rc::{MutRc, RcDeref, RcDerefMut};

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Task,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

/// A virtual time scheduler. Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct TestScheduler(MutRc<TestSchedulerState>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Number of queued tasks that are still going to run.
  pub fn pending_count(&self) -> usize {
    self
      .0
      .rc_deref()
      .task_queue
      .iter()
      .filter(|t| !t.handle.is_cancelled())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  fn execute_tasks_until(&self, target_time: Option<Duration>) {
    loop {
      let task = {
        let mut state = self.0.rc_deref_mut();
        let should_stop = state
          .task_queue
          .peek()
          .is_none_or(|peek| target_time.is_some_and(|limit| peek.scheduled_time > limit));
        if should_stop {
          None
        } else {
          state.task_queue.pop().inspect(|scheduled| {
            state.virtual_time = state.virtual_time.max(scheduled.scheduled_time);
          })
        }
      };

      let Some(scheduled_task) = task else {
        break;
      };
      if !scheduled_task.handle.is_cancelled() {
        (scheduled_task.task)();
      }
    }
  }

  /// Advance virtual time by `duration`, running every task due meanwhile.
  pub fn advance_by(&self, duration: Duration) {
    let target_time = self.0.rc_deref().virtual_time + duration;
    self.advance_to(target_time);
  }

  /// Advance virtual time to `target_time`. Moving backwards is ignored.
  pub fn advance_to(&self, target_time: Duration) {
    self.execute_tasks_until(Some(target_time));
    let mut state = self.0.rc_deref_mut();
    state.virtual_time = state.virtual_time.max(target_time);
  }

  /// Run tasks due right now, without moving the clock.
  pub fn run_due(&self) { self.advance_by(Duration::ZERO) }

  /// Run every pending task, advancing time to each task's due time.
  /// Repeating tasks keep the loop going until they are cancelled.
  pub fn flush(&self) { self.execute_tasks_until(None); }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { self.0.rc_deref().virtual_time }

  fn schedule_task(&self, delay: Duration, task: Task, handle: TaskHandle) {
    let mut state = self.0.rc_deref_mut();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let scheduled_time = state.virtual_time + delay;
    state.task_queue.push(ScheduledTask { scheduled_time, task_id, task, handle });
  }
}
