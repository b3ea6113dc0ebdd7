//! Delayed-Deletion Scheduler
//!
//! Each backend owns one [`Scheduler`]. A `set` with a lifetime registers a
//! task here; when the deadline passes the task fires on a background worker
//! and deletes the key from the backend. Deleting or renaming the key first
//! cancels the task.
//!
//! ## Design
//!
//! Every registered task gets its own Tokio worker that polls the shared
//! registry at a 100 ms tick. The worker exits when it observes one of:
//!
//! 1. Cancellation (`stop_task` was called) - exits without firing
//! 2. Global shutdown - exits without firing
//! 3. Deadline reached - runs the task exactly once
//!
//! A garbage-collection loop reaps finished registry entries every 300 ms so
//! identifiers can be reclaimed after completion, never before.
//!
//! Polling is deliberate: lifetimes count in whole seconds, so a 100 ms
//! resolution is plenty and keeps the worker loop trivial to reason about.
//! The registry lock is only ever held for a few map operations and never
//! across a task callback, which is what lets callbacks re-enter the backend
//! without deadlocking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Interval at which task workers re-check their deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval at which the garbage-collection loop reaps finished tasks.
const GC_INTERVAL: Duration = Duration::from_millis(300);

/// Identifier of a scheduled task. Process-unique and nonzero.
pub type TaskId = u64;

/// Per-task bookkeeping shared between the caller and its worker.
struct TaskState {
    deadline: Instant,
    cancelled: bool,
    done: bool,
}

#[derive(Default)]
struct Registry {
    tasks: HashMap<TaskId, TaskState>,
    next_id: TaskId,
}

impl Registry {
    /// Allocates a fresh nonzero id, skipping over any id still present in
    /// the map. Ids are never reused while the old entry remains.
    fn allocate(&mut self) -> TaskId {
        while self.next_id == 0 || self.tasks.contains_key(&self.next_id) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

/// Schedules callbacks to run once after a delay, with cancellation and
/// remaining-time inspection.
///
/// Requires an ambient Tokio runtime: construction spawns the
/// garbage-collection loop and every [`delay_task`](Scheduler::delay_task)
/// spawns a worker.
///
/// Dropping the scheduler signals shutdown; workers observe the flag within
/// one poll tick and exit without firing. [`shutdown`](Scheduler::shutdown)
/// additionally waits for all workers to finish.
pub struct Scheduler {
    registry: Arc<Mutex<Registry>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let registry = Arc::new(Mutex::new(Registry::default()));

        let scheduler = Self {
            registry,
            workers: Mutex::new(Vec::new()),
            shutdown_tx,
        };
        scheduler.spawn_gc_loop(shutdown_rx);
        scheduler
    }

    /// Registers `task` to run once after `delay`, unless cancelled or shut
    /// down first. Returns the task's id.
    ///
    /// The task runs on a background worker, so it must be safe to invoke
    /// concurrently with other operations on whatever it touches.
    pub fn delay_task<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = {
            let mut registry = self.registry.lock().unwrap();
            let id = registry.allocate();
            registry.tasks.insert(
                id,
                TaskState {
                    deadline: Instant::now() + delay,
                    cancelled: false,
                    done: false,
                },
            );
            id
        };

        debug!(id, delay_secs = delay.as_secs_f64(), "task registered");

        let registry = Arc::clone(&self.registry);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let fire = loop {
                tokio::time::sleep(POLL_INTERVAL).await;

                if *shutdown_rx.borrow_and_update() {
                    break false;
                }

                let reg = registry.lock().unwrap();
                match reg.tasks.get(&id) {
                    Some(state) if state.cancelled => break false,
                    Some(state) if state.deadline <= Instant::now() => break true,
                    Some(_) => {}
                    // Reaped out from under us; nothing left to do.
                    None => break false,
                }
            };

            // The registry lock is never held across the callback: the task
            // may re-enter the backend that owns this scheduler.
            if fire {
                debug!(id, "task fired");
                task();
            }

            if let Some(state) = registry.lock().unwrap().tasks.get_mut(&id) {
                state.done = true;
            }
        });

        self.workers.lock().unwrap().push(handle);
        id
    }

    /// Marks the task cancelled. If it has not yet fired, it never will.
    ///
    /// Idempotent; unknown ids are ignored. A task that fires before the
    /// cancellation is observed may still run to completion.
    pub fn stop_task(&self, id: TaskId) {
        let mut registry = self.registry.lock().unwrap();
        if let Some(state) = registry.tasks.get_mut(&id) {
            state.cancelled = true;
            debug!(id, "task cancelled");
        }
    }

    /// Returns the time remaining until the task's deadline.
    ///
    /// Zero if the task is unknown or already due.
    pub fn remain_time(&self, id: TaskId) -> Duration {
        let registry = self.registry.lock().unwrap();
        registry
            .tasks
            .get(&id)
            .map(|state| state.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Signals shutdown and waits for every worker to finish.
    ///
    /// Workers observe the flag within one poll tick and exit without firing
    /// their tasks.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let handles: Vec<_> = self.workers.lock().unwrap().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("scheduler shut down");
    }

    fn spawn_gc_loop(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let registry = Arc::clone(&self.registry);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(GC_INTERVAL) => {}
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            return;
                        }
                    }
                }

                let mut registry = registry.lock().unwrap();
                let before = registry.tasks.len();
                registry.tasks.retain(|_, state| !state.done);

                let reaped = before - registry.tasks.len();
                if reaped > 0 {
                    trace!(reaped, "gc reaped finished tasks");
                }
            }
        });

        self.workers.lock().unwrap().push(handle);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Workers observe the flag within one poll tick and exit without
        // firing. Waiting for them needs `shutdown`, since Drop cannot await.
        let _ = self.shutdown_tx.send(true);
    }
}
