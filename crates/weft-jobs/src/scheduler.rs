//! Fixed-size worker pool.
//!
//! Jobs travel over an unbounded crossbeam queue shared by every worker;
//! each job's result comes back on its own single-slot channel owned by
//! the [`TaskHandle`]. A panicking job is caught on the worker and
//! re-raised on whichever thread waits for it, so one bad solver step
//! cannot take a worker down with it.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use tracing::{debug, error, info, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed pool of worker threads.
///
/// Dropping the scheduler closes the queue, lets the workers drain any
/// jobs still queued, and joins them.
pub struct JobScheduler {
    sender: Option<Sender<Job>>,
    workers: Vec<Worker>,
}

struct Worker {
    id: usize,
    thread: JoinHandle<()>,
}

impl JobScheduler {
    /// Spawns `workers` threads; `0` means one per available core.
    pub fn new(workers: usize) -> Self {
        let count = if workers == 0 {
            thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            workers
        };

        let (sender, receiver) = unbounded::<Job>();
        let mut pool = Vec::with_capacity(count);
        for id in 0..count {
            match Worker::spawn(id, receiver.clone()) {
                Ok(worker) => pool.push(worker),
                Err(err) => warn!(worker = id, %err, "failed to spawn worker thread"),
            }
        }
        info!(workers = pool.len(), "job scheduler started");

        Self {
            sender: Some(sender),
            workers: pool,
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues `f` and returns a handle to its result.
    ///
    /// With no live workers the job runs inline on the calling thread.
    pub fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            // The handle may already be gone; nobody is waiting then.
            let _ = tx.send(outcome);
        });

        match &self.sender {
            Some(sender) => {
                if let Err(SendError(job)) = sender.send(job) {
                    debug!("job queue has no receivers, running inline");
                    job();
                }
            }
            None => job(),
        }

        TaskHandle { receiver: rx }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.thread.join().is_err() {
                error!(worker = worker.id, "worker thread panicked outside a job");
            }
        }
        debug!("job scheduler stopped");
    }
}

impl Worker {
    fn spawn(id: usize, receiver: Receiver<Job>) -> std::io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("weft-worker-{id}"))
            .spawn(move || {
                for job in receiver.iter() {
                    job();
                }
            })?;
        Ok(Self { id, thread })
    }
}

/// The pending result of one submitted job.
pub struct TaskHandle<T> {
    receiver: Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the job has run and returns its result.
    ///
    /// # Panics
    /// Re-raises the job's panic on the calling thread.
    pub fn wait(self) -> T {
        match self.receiver.recv() {
            Ok(Ok(value)) => value,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            // Queued jobs always run, even while the pool shuts down.
            Err(_) => unreachable!("job was dropped without running"),
        }
    }

    /// True once the job's result is ready; never blocks.
    pub fn is_finished(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Waits on every handle in order and collects the results.
pub fn wait_all<T>(handles: impl IntoIterator<Item = TaskHandle<T>>) -> Vec<T> {
    handles.into_iter().map(TaskHandle::wait).collect()
}
