//! Bounded-concurrency conversion scheduler.
//!
//! The [`Scheduler`] maps a finite task list onto a fixed number of slots.
//! A single coordinator task owns the in-flight set: it fills free slots
//! from the task cursor, waits for whichever conversion finishes first,
//! emits that outcome, and refills. Outcomes therefore arrive in completion
//! order; each task's sequence number still records discovery order.
//!
//! Every task yields exactly one [`Outcome`]. A worker that panics or is
//! aborted is reported as a failure built from its in-flight entry, so no
//! task is ever lost.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use audioforge_core::{Error, Outcome, Task};
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinSet};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Dispatches tasks to at most `max_concurrent` concurrent conversions.
#[derive(Debug, Clone)]
pub struct Scheduler {
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl Scheduler {
    /// Create a scheduler. A capacity of 0 is treated as 1.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop dispatching and abort in-flight work when `token` fires.
    ///
    /// Tasks that are aborted or never started still produce a failure
    /// outcome each before the stream ends.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Slot count for this scheduler.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run `convert` over every task and stream the outcomes as they finish.
    ///
    /// The returned stream yields exactly one outcome per task and ends after
    /// the last one. Dropping it early cancels the run. Must be called from
    /// within a tokio runtime.
    pub fn run<F, Fut>(&self, tasks: Vec<Task>, convert: F) -> Outcomes
    where
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = self.cancel.child_token();

        let coordinator = Coordinator {
            max_concurrent: self.max_concurrent,
            cancel: cancel.clone(),
            tx,
        };
        tokio::spawn(coordinator.drive(tasks, convert));

        Outcomes {
            inner: UnboundedReceiverStream::new(rx),
            _guard: cancel.drop_guard(),
        }
    }
}

/// Lazy stream of outcomes returned by [`Scheduler::run`].
pub struct Outcomes {
    inner: UnboundedReceiverStream<Outcome>,
    _guard: DropGuard,
}

impl Stream for Outcomes {
    type Item = Outcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Outcome>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Sole owner of the in-flight set for one run.
struct Coordinator {
    max_concurrent: usize,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<Outcome>,
}

impl Coordinator {
    async fn drive<F, Fut>(self, tasks: Vec<Task>, convert: F)
    where
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let total = tasks.len();
        let mut pending = tasks.into_iter();
        let mut workers: JoinSet<Outcome> = JoinSet::new();
        let mut in_flight: HashMap<task::Id, Task> = HashMap::with_capacity(self.max_concurrent);
        let mut cancelled = false;
        let convert = Arc::new(convert);

        debug!("Scheduling {} task(s) over {} slot(s)", total, self.max_concurrent);

        loop {
            if !cancelled {
                while in_flight.len() < self.max_concurrent {
                    let Some(task) = pending.next() else {
                        break;
                    };
                    // Build the future inside the worker so a panicking
                    // closure fails only its own task.
                    let convert = Arc::clone(&convert);
                    let job = task.clone();
                    let handle = workers.spawn(async move { (*convert)(job).await });
                    debug!(
                        "{} dispatched ({} in flight)",
                        task.label(),
                        in_flight.len() + 1
                    );
                    in_flight.insert(handle.id(), task);
                }
            }

            if in_flight.is_empty() {
                break;
            }

            let joined = tokio::select! {
                biased;

                _ = self.cancel.cancelled(), if !cancelled => {
                    info!("Run cancelled; aborting {} in-flight conversion(s)", in_flight.len());
                    cancelled = true;
                    workers.abort_all();
                    continue;
                }
                joined = workers.join_next_with_id() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            let outcome = match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    outcome
                }
                Err(err) => {
                    let Some(task) = in_flight.remove(&err.id()) else {
                        warn!("Join error for unknown task: {}", err);
                        continue;
                    };
                    Outcome::failure(task, join_failure_detail(err), Duration::ZERO)
                }
            };

            self.emit(outcome);
        }

        for task in pending {
            let detail = Error::cancelled("cancelled before start").to_string();
            self.emit(Outcome::failure(task, detail, Duration::ZERO));
        }

        debug!("Scheduler finished {} task(s)", total);
    }

    fn emit(&self, outcome: Outcome) {
        // The receiver is gone only when the consumer dropped the stream.
        let _ = self.tx.send(outcome);
    }
}

fn join_failure_detail(err: JoinError) -> String {
    if err.is_cancelled() {
        return Error::cancelled("conversion cancelled while running").to_string();
    }

    match err.try_into_panic() {
        Ok(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            format!("worker panicked: {message}")
        }
        Err(err) => format!("worker failed: {err}"),
    }
}
