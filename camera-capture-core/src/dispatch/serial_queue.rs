use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::traits::callback_executor::{CallbackExecutor, Job};

struct QueueState {
    jobs: VecDeque<Job>,
    suspended: usize,
    shutdown: bool,
}

struct QueueShared {
    label: String,
    state: Mutex<QueueState>,
    available: Condvar,
}

/// Single-worker FIFO execution context.
///
/// Jobs run one at a time on a dedicated named thread, in submission order.
/// While suspended, no new job starts; already-queued jobs wait until every
/// `suspend` has been balanced by a `resume`.
///
/// Dropping the queue runs the remaining jobs (unless suspended) and joins
/// the worker.
pub struct SerialQueue {
    shared: Arc<QueueShared>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

impl SerialQueue {
    pub fn new(label: &str) -> io::Result<Self> {
        let shared = Arc::new(QueueShared {
            label: label.to_string(),
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                suspended: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || run_worker(&worker_shared))?;
        let worker_id = handle.thread().id();

        Ok(Self {
            shared,
            worker: Some(handle),
            worker_id,
        })
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Enqueue `job` behind everything submitted before it.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            log::warn!("Queue {} is shutting down, dropping job", self.shared.label);
            return;
        }
        state.jobs.push_back(Box::new(job));
        drop(state);
        self.shared.available.notify_one();
    }

    /// Run `f` on the worker after all previously submitted jobs and wait
    /// for its result.
    ///
    /// Runs inline when called from the worker itself. Returns `None` if the
    /// queue shut down before `f` could run.
    pub fn sync<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Some(f());
        }

        let (tx, rx) = mpsc::channel();
        self.dispatch(move || {
            let _ = tx.send(f());
        });
        rx.recv().ok()
    }

    /// Stop starting jobs until a matching `resume`.
    pub fn suspend(&self) {
        self.shared.state.lock().suspended += 1;
    }

    pub fn resume(&self) {
        let mut state = self.shared.state.lock();
        if state.suspended == 0 {
            log::warn!("Queue {} resumed without being suspended", self.shared.label);
            return;
        }
        state.suspended -= 1;
        let ready = state.suspended == 0;
        drop(state);
        if ready {
            self.shared.available.notify_all();
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.state.lock().suspended > 0
    }

    /// Number of jobs waiting to start.
    pub fn pending_jobs(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    /// Whether the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.worker_id
    }
}

impl CallbackExecutor for SerialQueue {
    fn execute(&self, job: Job) {
        self.dispatch(job);
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.available.notify_all();

        // The last owner may be a job running on the worker itself.
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn run_worker(shared: &QueueShared) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if state.suspended == 0 {
                    if let Some(job) = state.jobs.pop_front() {
                        break Some(job);
                    }
                }
                if state.shutdown && (state.jobs.is_empty() || state.suspended > 0) {
                    break None;
                }
                shared.available.wait(&mut state);
            }
        };

        let Some(job) = job else {
            log::debug!("Queue {} worker exiting", shared.label);
            return;
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("Job on queue {} panicked", shared.label);
        }
    }
}
