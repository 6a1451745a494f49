//! Provides the fixed-size worker pool used to drain a queue of targets

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
};

use crate::error::{RNetLibError, Result};

/// FIFO shared by all workers of a pool
///
/// The queue is filled and closed on construction, so a worker that finds
/// it empty knows no further items will arrive. Every item is handed to
/// exactly one caller of [`WorkQueue::next`].
pub struct WorkQueue<T> {
    receiver: Mutex<mpsc::Receiver<T>>,
    len: usize,
}

impl<T> WorkQueue<T> {
    /// Returns a closed queue holding `items` in order
    pub fn closed_from<I: IntoIterator<Item = T>>(items: I) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let mut len = 0;

        for item in items {
            sender.send(item).map_err(|e| {
                RNetLibError::QueueLock(format!("failed to enqueue target: {e}"))
            })?;
            len += 1;
        }

        // dropping the only sender closes the queue
        drop(sender);

        Ok(Self {
            receiver: Mutex::new(receiver),
            len,
        })
    }

    /// Returns the number of items the queue was created with
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the queue was created without items
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dequeues the next item, or `None` once the queue is drained
    pub fn next(&self) -> Result<Option<T>> {
        let receiver = self.receiver.lock()?;
        Ok(receiver.recv().ok())
    }
}

// Raises the abort flag if the owning worker unwinds mid job
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

/// A fixed number of OS threads consuming a [`WorkQueue`]
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Returns a pool of `workers` threads (at least one)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Returns the configured number of workers
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `job` for every item of `queue` and returns once every worker
    /// has exited and been joined
    ///
    /// All workers are spawned before any item is dequeued. A job error or
    /// a worker panic stops the remaining workers from taking new items;
    /// the first such failure is returned after the join.
    pub fn run<T, F>(&self, queue: &WorkQueue<T>, job: F) -> Result<()>
    where
        T: Send,
        F: Fn(T) -> Result<()> + Sync,
    {
        // never park more threads than there is work for
        let workers = self.workers.min(queue.len()).max(1);
        let abort = AtomicBool::new(false);
        let job = &job;
        let abort_ref = &abort;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut first_error: Option<RNetLibError> = None;

            for id in 0..workers {
                let spawned = thread::Builder::new()
                    .name(format!("scan-worker-{id}"))
                    .spawn_scoped(scope, move || work(id, queue, abort_ref, job));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        log::error!("failed to spawn worker {}: {}", id, e);
                        abort.store(true, Ordering::SeqCst);
                        first_error = Some(e.into());
                        break;
                    }
                }
            }

            log::debug!("started {} workers", handles.len());

            for handle in handles {
                let outcome = match handle.join() {
                    Ok(res) => res,
                    Err(panic) => Err(RNetLibError::from(panic)),
                };

                if let Err(e) = outcome {
                    first_error.get_or_insert(e);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }
}

fn work<T, F>(
    id: usize,
    queue: &WorkQueue<T>,
    abort: &AtomicBool,
    job: &F,
) -> Result<()>
where
    F: Fn(T) -> Result<()>,
{
    let _guard = AbortOnPanic(abort);

    while !abort.load(Ordering::SeqCst) {
        let Some(item) = queue.next()? else {
            log::debug!("worker {} found queue drained", id);
            return Ok(());
        };

        if let Err(e) = job(item) {
            abort.store(true, Ordering::SeqCst);
            return Err(e);
        }
    }

    log::debug!("worker {} stopping early", id);
    Ok(())
}

#[cfg(test)]
#[path = "./pool_tests.rs"]
mod tests;
