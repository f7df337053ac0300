//! Fixed-size worker pool for acquisition jobs.
//!
//! Acquisition work is blocking end to end (blocking HTTP, CPU-bound
//! warp), so jobs run on dedicated OS threads rather than an async
//! runtime. The pool size is fixed at construction; results travel back
//! through a oneshot channel whose receiving half doubles as both a
//! future and a blocking handle.

use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::thread;

use tokio::sync::oneshot;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a submitted job.
///
/// Await it from async code, or call [`JobHandle::wait`] to block the
/// current thread. Both resolve to `None` if the job was lost (worker
/// panic or pool shutdown before execution).
pub struct JobHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks until the job completes.
    pub fn wait(self) -> Option<T> {
        self.receiver.blocking_recv().ok()
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
    }
}

/// Fixed pool of worker threads consuming a shared job queue.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..threads.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || loop {
                    let job = {
                        let guard = match receiver.lock() {
                            Ok(guard) => guard,
                            // A worker panicked while holding the lock;
                            // the queue is unusable.
                            Err(_) => break,
                        };
                        guard.recv()
                    };
                    match job {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })
            })
            .collect();

        debug!(threads = threads.max(1), "Started worker pool");
        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Creates a pool sized to the available hardware concurrency.
    pub fn with_default_size() -> Self {
        let threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(threads)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Submits a job; the returned handle resolves to its result.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let boxed: Job = Box::new(move || {
            // The caller may have dropped the handle; the result is
            // simply discarded then.
            let _ = tx.send(job());
        });
        if let Some(sender) = &self.sender {
            let _ = sender.send(boxed);
        }
        JobHandle { receiver: rx }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain the queue and exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
