//! Scheduler abstraction: where deferred work runs and how time is measured.
//!
//! Time-based operators (`debounce`, `interval`) and the context switch of
//! `receive_on` never assume an execution context: a scheduler is always
//! passed in explicitly. Tasks are plain closures; a [`TaskHandle`] cancels a
//! task that has not run yet.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

pub use std::time::Duration;

mod immediate;
#[cfg(feature = "timer")]
mod run_loop;
pub mod test_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate::ImmediateScheduler;
#[cfg(feature = "timer")]
pub use run_loop::RunLoopScheduler;
pub use test_scheduler::TestScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioLocalScheduler;

pub type Task = Box<dyn FnOnce()>;

/// Cancellation handle of a scheduled task.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Rc<Cell<bool>>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// Prevent the task from running. No effect once it ran.
  pub fn cancel(&self) { self.0.set(true) }

  pub fn is_cancelled(&self) -> bool { self.0.get() }
}

pub trait Scheduler: Clone + 'static {
  /// Time elapsed since the scheduler's epoch.
  fn now(&self) -> Duration;

  /// Run `task` after `delay`, unless `handle` is cancelled first.
  fn schedule_task(&self, delay: Duration, task: Task, handle: TaskHandle);

  /// Run `task` as soon as the scheduler gets to it.
  fn schedule(&self, task: impl FnOnce() + 'static) -> TaskHandle {
    self.schedule_after(Duration::ZERO, task)
  }

  fn schedule_after(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    self.schedule_task(delay, Box::new(task), handle.clone());
    handle
  }

  /// Run `task` every `period` until the returned handle is cancelled.
  fn schedule_repeating(&self, period: Duration, task: impl FnMut() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    repeat(self.clone(), period, Rc::new(RefCell::new(task)), handle.clone());
    handle
  }
}

fn repeat<SD, F>(scheduler: SD, period: Duration, task: Rc<RefCell<F>>, handle: TaskHandle)
where
  SD: Scheduler,
  F: FnMut() + 'static,
{
  let next = scheduler.clone();
  let tick_handle = handle.clone();
  scheduler.schedule_task(
    period,
    Box::new(move || {
      {
        let mut tick = task.borrow_mut();
        (&mut *tick)();
      }
      if !tick_handle.is_cancelled() {
        repeat(next, period, task, tick_handle);
      }
    }),
    handle,
  );
}
