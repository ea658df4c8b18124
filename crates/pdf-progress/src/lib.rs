//! Background work with observable progress.
//!
//! A [`ProgressTask`] runs one unit of blocking work on the Tokio blocking
//! pool. The worker reports through a [`Progress`] handle; any number of
//! callers may poll the task while it runs, and one caller finally
//! synchronizes with it to take the result.
//!
//! Whatever way the worker ends (value, error or panic), the completed count
//! is forced to the total so percentage-based polling always converges.

use std::any::Any;
use std::error::Error;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Failure surfaced by a task whose worker did not return a value
#[derive(Error, Debug)]
pub enum TaskError<E: Error + 'static> {
    /// The worker returned an error. Displays exactly as the original error.
    #[error(transparent)]
    Failed(Arc<E>),
    /// The worker panicked
    #[error("worker panicked: {0}")]
    Panicked(String),
    /// The worker was dropped by the runtime before it could run to completion
    #[error("worker stopped before completing")]
    Abandoned,
}

impl<E: Error + 'static> TaskError<E> {
    /// The original error returned by the worker, if any
    pub fn failure(&self) -> Option<&E> {
        match self {
            TaskError::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<E: Error + 'static> Clone for TaskError<E> {
    fn clone(&self) -> Self {
        match self {
            TaskError::Failed(err) => TaskError::Failed(Arc::clone(err)),
            TaskError::Panicked(msg) => TaskError::Panicked(msg.clone()),
            TaskError::Abandoned => TaskError::Abandoned,
        }
    }
}

/// Lifecycle of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

/// Point-in-time copy of a task's counters
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub message: String,
    pub percent: f64,
}

#[derive(Debug, Clone)]
struct Counters {
    completed: usize,
    total: usize,
    message: String,
}

impl Counters {
    fn percent(&self, done: bool) -> f64 {
        if self.total == 0 {
            return if done { 100.0 } else { 0.0 };
        }
        round3(100.0 * self.completed as f64 / self.total as f64)
    }
}

struct ProgressState<T, E: Error + 'static> {
    counters: Counters,
    outcome: Option<Result<T, TaskError<E>>>,
}

impl<T, E: Error + 'static> ProgressState<T, E> {
    fn new() -> Self {
        Self {
            counters: Counters {
                completed: 0,
                total: 1,
                message: String::new(),
            },
            outcome: None,
        }
    }
}

/// Counter access shared by every `ProgressState`, so the worker-facing
/// handle does not carry the task's result types.
trait CounterAccess: Send + Sync {
    fn update(&self, f: &mut dyn FnMut(&mut Counters));
}

impl<T: Send, E: Error + Send + Sync + 'static> CounterAccess for Mutex<ProgressState<T, E>> {
    fn update(&self, f: &mut dyn FnMut(&mut Counters)) {
        let mut state = self.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state.counters);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Worker-side handle for publishing progress
#[derive(Clone)]
pub struct Progress {
    shared: Arc<dyn CounterAccess>,
}

impl Progress {
    pub fn set_total(&self, total: usize) {
        self.shared.update(&mut |c| c.total = total);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.shared.update(&mut |c| c.message.clone_from(&message));
    }

    pub fn increment(&self, by: usize) {
        self.shared.update(&mut |c| c.completed += by);
    }

    pub fn set_progress(&self, completed: usize) {
        self.shared.update(&mut |c| c.completed = completed);
    }
}

/// Handle to work running in the background
pub struct ProgressTask<T, E: Error + 'static> {
    state: Arc<Mutex<ProgressState<T, E>>>,
    done: watch::Receiver<bool>,
}

impl<T, E> ProgressTask<T, E>
where
    T: Send + 'static,
    E: Error + Send + Sync + 'static,
{
    /// Start `work` on the blocking pool and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce(&Progress) -> Result<T, E> + Send + 'static,
    {
        let state = Arc::new(Mutex::new(ProgressState::new()));
        let (done_tx, done_rx) = watch::channel(false);

        let worker_state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            let progress = Progress {
                shared: worker_state.clone(),
            };

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| work(&progress))) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(TaskError::Failed(Arc::new(err))),
                Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
            };

            {
                let mut state = lock(&worker_state);
                state.counters.completed = state.counters.total;
                if let Err(err) = &outcome {
                    log::debug!("Task failed: {err}");
                    state.counters.message = err.to_string();
                }
                state.outcome = Some(outcome);
            }
            let _ = done_tx.send(true);
        });

        Self {
            state,
            done: done_rx,
        }
    }

    /// Non-blocking check for a terminal state
    pub fn is_done(&self) -> bool {
        lock(&self.state).outcome.is_some()
    }

    pub fn status(&self) -> TaskStatus {
        match lock(&self.state).outcome {
            None => TaskStatus::Running,
            Some(Ok(_)) => TaskStatus::Completed,
            Some(Err(_)) => TaskStatus::Failed,
        }
    }

    /// Re-raise the recorded failure, if any. Poll loops must call this so a
    /// failed task is not mistaken for one still converging.
    pub fn check_failure(&self) -> Result<(), TaskError<E>> {
        match &lock(&self.state).outcome {
            Some(Err(err)) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// completed / total × 100, rounded to 3 decimals
    pub fn percent_complete(&self) -> f64 {
        let state = lock(&self.state);
        state.counters.percent(state.outcome.is_some())
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = lock(&self.state);
        ProgressSnapshot {
            completed: state.counters.completed,
            total: state.counters.total,
            message: state.counters.message.clone(),
            percent: state.counters.percent(state.outcome.is_some()),
        }
    }

    /// Wait for the worker to reach a terminal state without consuming the task
    pub async fn wait(&self) {
        let mut done = self.done.clone();
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Wait for the worker, then return its value or re-raise its failure
    pub async fn synchronize(self) -> Result<T, TaskError<E>> {
        self.wait().await;
        lock(&self.state).outcome.take().unwrap_or(Err(TaskError::Abandoned))
    }

    /// Like [`synchronize`](Self::synchronize), writing
    /// `completed/total percent% message` to `sink` on every poll tick.
    pub async fn synchronize_with_display(
        self,
        poll_interval: Duration,
        mut sink: impl Write,
    ) -> Result<T, TaskError<E>> {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            let finished = self.is_done();
            let snapshot = self.snapshot();
            let _ = write!(
                sink,
                "\r{}/{} {}% {}",
                snapshot.completed, snapshot.total, snapshot.percent, snapshot.message
            );
            let _ = sink.flush();
            if finished {
                let _ = writeln!(sink);
                break;
            }
        }
        self.synchronize().await
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
