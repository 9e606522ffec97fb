//! Worker pool running dispatch off the transport's I/O threads.
//!
//! The transport submits each decoded [`Request`] and gets a [`PendingReply`]
//! back immediately. A fixed set of worker threads drains the queue and runs
//! [`Dispatcher::route`]. Giving up on a reply does not stop the handler: the
//! worker finishes the request and its response is discarded.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use campus_router::{Dispatcher, Request, RequestId, Response};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, error, info};

const POOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pool");

/// Errors raised by the dispatch pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A worker thread could not be spawned.
    #[error("failed to spawn dispatch worker {index}: {source}")]
    Spawn {
        /// Worker index.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// Every worker has stopped; the request was not queued.
    #[error("dispatch pool is closed")]
    Closed,
}

struct Job {
    request: Request,
    reply: Sender<Response>,
}

/// Fixed-size pool of dispatch workers.
#[derive(Debug)]
pub struct DispatchPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl DispatchPool {
    /// Starts `workers` threads (at least one) routing through `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] when a thread cannot be created; workers
    /// already started are shut down first.
    pub fn start(dispatcher: &Dispatcher, workers: usize) -> Result<Self, PoolError> {
        let (sender, receiver) = channel::unbounded::<Job>();
        let mut pool = Self {
            jobs: Some(sender),
            workers: Vec::with_capacity(workers.max(1)),
        };

        for index in 0..workers.max(1) {
            let queue = receiver.clone();
            let worker = dispatcher.clone();
            let handle = thread::Builder::new()
                .name(format!("campus-dispatch-{index}"))
                .spawn(move || run_worker(&worker, &queue))
                .map_err(|source| PoolError::Spawn { index, source })?;
            pool.workers.push(handle);
        }

        info!(
            target: POOL_TARGET,
            workers = pool.workers.len(),
            "dispatch pool started"
        );
        Ok(pool)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Queues `request` for dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] when no worker is left to take the job.
    pub fn submit(&self, request: Request) -> Result<PendingReply, PoolError> {
        let id = request.id().clone();
        let (reply, receiver) = channel::bounded(1);
        self.jobs
            .as_ref()
            .ok_or(PoolError::Closed)?
            .send(Job { request, reply })
            .map_err(|_| PoolError::Closed)?;
        Ok(PendingReply { id, receiver })
    }

    /// Stops accepting work, lets queued requests finish, and joins every
    /// worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("campus-dispatch").to_owned();
            if handle.join().is_err() {
                error!(target: POOL_TARGET, worker = %name, "dispatch worker panicked");
            }
        }
        debug!(target: POOL_TARGET, "dispatch pool stopped");
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        if self.jobs.is_some() {
            self.stop();
        }
    }
}

fn run_worker(dispatcher: &Dispatcher, queue: &Receiver<Job>) {
    for job in queue {
        let response = dispatcher.route(&job.request);
        if job.reply.send(response).is_err() {
            debug!(
                target: POOL_TARGET,
                id = %job.request.id(),
                "caller stopped waiting; response discarded"
            );
        }
    }
}

/// Response slot for a submitted request.
#[derive(Debug)]
pub struct PendingReply {
    id: RequestId,
    receiver: Receiver<Response>,
}

impl PendingReply {
    /// Id of the request this reply belongs to.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Blocks until the response is ready.
    #[must_use]
    pub fn wait(self) -> Response {
        self.receiver.recv().unwrap_or_else(|_| self.lost())
    }

    /// Waits at most `timeout` for the response. `None` means the request is
    /// still running; the caller may wait again.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Response> {
        match self.receiver.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.lost()),
        }
    }

    fn lost(&self) -> Response {
        Response::internal_error("dispatch worker stopped before replying")
            .with_id(self.id.clone())
    }
}
