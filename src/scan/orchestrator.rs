// Batch orchestration over a per-scan rayon pool

use crate::error::ScanResult;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Worker stack size; syntax trees of generated sources nest deeply
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Completed-task count reported while a scan runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub label: &'static str,
    pub completed: usize,
    pub total: usize,
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Everything the collector received before all tasks reported or the
/// deadline passed
#[derive(Debug)]
pub struct BatchReport<R> {
    pub results: Vec<R>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub timed_out: bool,
}

impl<R> BatchReport<R> {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_tasks: 0,
            completed_tasks: 0,
            failed_tasks: 0,
            timed_out: false,
        }
    }
}

enum TaskOutcome<R> {
    Done(Vec<R>),
    Failed(String),
    Cancelled,
}

/// Runs batches of work on a fixed-size pool and collects their outcomes
/// through a completion queue
#[derive(Clone)]
pub struct Orchestrator {
    threads: usize,
    timeout: Duration,
    progress_interval: usize,
    progress: Option<ProgressCallback>,
}

impl Orchestrator {
    pub fn new(threads: usize, timeout: Duration) -> Self {
        Self {
            threads: threads.max(1),
            timeout,
            progress_interval: 10,
            progress: None,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_progress(mut self, callback: Option<ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Split `items` into batches of `batch_size` and run `task` once per batch.
    ///
    /// A task that errors or panics is logged and contributes nothing. When
    /// the timeout passes, batches that have not started are cancelled and
    /// the results collected so far are returned.
    pub fn run<T, R, F>(
        &self,
        label: &'static str,
        items: Vec<T>,
        batch_size: usize,
        task: F,
    ) -> ScanResult<BatchReport<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(Vec<T>) -> ScanResult<Vec<R>> + Send + Sync + 'static,
    {
        let batches = into_batches(items, batch_size.max(1));
        let total = batches.len();
        if total == 0 {
            return Ok(BatchReport::empty());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .stack_size(WORKER_STACK_SIZE)
            .thread_name(move |i| format!("bigclean-{}-{}", label, i))
            .build()?;

        info!(
            "{}: {} tasks on {} worker threads",
            label, total, self.threads
        );

        let task = Arc::new(task);
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<TaskOutcome<R>>();

        for batch in batches {
            let tx = tx.clone();
            let task = Arc::clone(&task);
            let cancelled = Arc::clone(&cancelled);

            pool.spawn(move || {
                let outcome = if cancelled.load(Ordering::Relaxed) {
                    TaskOutcome::Cancelled
                } else {
                    match panic::catch_unwind(AssertUnwindSafe(|| task(batch))) {
                        Ok(Ok(results)) => TaskOutcome::Done(results),
                        Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
                        Err(payload) => TaskOutcome::Failed(panic_message(payload.as_ref())),
                    }
                };
                // The collector is gone once it has timed out
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        // No deadline when the timeout does not fit in an `Instant`
        let deadline = Instant::now().checked_add(self.timeout);
        let mut report = BatchReport::empty();
        report.total_tasks = total;

        while report.completed_tasks < total {
            let received = match deadline {
                Some(deadline) => {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(outcome) => {
                    report.completed_tasks += 1;
                    match outcome {
                        TaskOutcome::Done(results) => report.results.extend(results),
                        TaskOutcome::Failed(message) => {
                            report.failed_tasks += 1;
                            warn!("{}: task failed: {}", label, message);
                        }
                        TaskOutcome::Cancelled => {}
                    }
                    self.report_progress(label, report.completed_tasks, total);
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "{}: timed out after {:?} with {}/{} tasks complete",
                        label, self.timeout, report.completed_tasks, total
                    );
                    cancelled.store(true, Ordering::Relaxed);
                    report.timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("{}: all workers finished", label);
                    break;
                }
            }
        }

        if report.failed_tasks > 0 {
            warn!("{}: {} of {} tasks failed", label, report.failed_tasks, total);
        }

        Ok(report)
    }

    fn report_progress(&self, label: &'static str, completed: usize, total: usize) {
        if completed % self.progress_interval == 0 || completed == total {
            info!("{}: processed {}/{}", label, completed, total);
        }
        if let Some(callback) = &self.progress {
            callback(Progress {
                label,
                completed,
                total,
            });
        }
    }
}

fn into_batches<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size);
    for item in items {
        current.push(item);
        if current.len() == batch_size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(batch_size)));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
