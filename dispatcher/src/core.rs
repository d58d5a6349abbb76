use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::DispatchError;
use crate::scheduler::DelayScheduler;
use config::QueueConfig;

type Producer<T> = Box<dyn FnOnce(u32) -> BoxFuture<'static, anyhow::Result<T>> + Send>;
type Lookup<T> = Box<dyn FnOnce(u32) -> BoxFuture<'static, Option<T>> + Send>;

struct QueuedRequest<T> {
    entity_id: u32,
    lookup: Option<Lookup<T>>,
    producer: Producer<T>,
    responder: oneshot::Sender<Result<T, DispatchError>>,
}

struct QueueState<T> {
    pending: VecDeque<QueuedRequest<T>>,
    draining: bool,
    last_dispatch: Option<Instant>,
}

/// FIFO request queue that keeps a minimum spacing between dispatches
///
/// Requests run one at a time in submission order. Each caller gets the
/// outcome of its own request; a failing request never stops the ones
/// behind it. Cloning yields another handle to the same queue.
pub struct Dispatcher<T> {
    state: Arc<Mutex<QueueState<T>>>,
    scheduler: DelayScheduler,
    min_spacing: Duration,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            scheduler: self.scheduler,
            min_spacing: self.min_spacing,
        }
    }
}

impl<T: Send + 'static> Dispatcher<T> {
    pub fn new(config: &QueueConfig) -> Self {
        Self::with_min_spacing(config.min_spacing())
    }

    pub fn with_min_spacing(min_spacing: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                last_dispatch: None,
            })),
            scheduler: DelayScheduler::new(),
            min_spacing,
        }
    }

    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// Number of requests waiting to be dispatched
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_draining(&self) -> bool {
        self.lock().draining
    }

    /// Append a request to the queue and start draining if idle
    ///
    /// The request is queued immediately, so the order of `enqueue` calls
    /// is the dispatch order. The returned future resolves with the
    /// producer's outcome. Must be called from within a tokio runtime.
    pub fn enqueue<F, Fut>(&self, entity_id: u32, producer: F) -> Pending<T>
    where
        F: FnOnce(u32) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.push(entity_id, None, Box::new(move |id| producer(id).boxed()))
    }

    /// Like `enqueue`, with a lookup that runs when the request reaches the
    /// front of the queue. A lookup hit answers the caller right away and
    /// does not count as a dispatch for spacing purposes.
    pub fn enqueue_with_lookup<L, LFut, F, Fut>(
        &self,
        entity_id: u32,
        lookup: L,
        producer: F,
    ) -> Pending<T>
    where
        L: FnOnce(u32) -> LFut + Send + 'static,
        LFut: Future<Output = Option<T>> + Send + 'static,
        F: FnOnce(u32) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.push(
            entity_id,
            Some(Box::new(move |id| lookup(id).boxed())),
            Box::new(move |id| producer(id).boxed()),
        )
    }

    fn push(&self, entity_id: u32, lookup: Option<Lookup<T>>, producer: Producer<T>) -> Pending<T> {
        let (responder, receiver) = oneshot::channel();
        let request = QueuedRequest {
            entity_id,
            lookup,
            producer,
            responder,
        };

        let start_drain = {
            let mut state = self.lock();
            state.pending.push_back(request);
            debug!(entity_id, queued = state.pending.len(), "request enqueued");
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_drain {
            tokio::spawn(drain(
                Arc::clone(&self.state),
                self.scheduler,
                self.min_spacing,
            ));
        }

        Pending { receiver }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        lock_state(&self.state)
    }
}

fn lock_state<T>(state: &Mutex<QueueState<T>>) -> MutexGuard<'_, QueueState<T>> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

async fn drain<T: Send + 'static>(
    state: Arc<Mutex<QueueState<T>>>,
    scheduler: DelayScheduler,
    min_spacing: Duration,
) {
    loop {
        // Emptiness check and flag reset happen under one lock so a
        // concurrent enqueue either sees draining=false or gets drained here.
        let request = {
            let mut guard = lock_state(&state);
            match guard.pending.pop_front() {
                Some(request) => request,
                None => {
                    guard.draining = false;
                    return;
                }
            }
        };
        let QueuedRequest {
            entity_id,
            lookup,
            producer,
            responder,
        } = request;

        if let Some(lookup) = lookup {
            let found = AssertUnwindSafe(async move { lookup(entity_id).await })
                .catch_unwind()
                .await;
            match found {
                Ok(Some(value)) => {
                    debug!(entity_id, "request answered by lookup");
                    respond(responder, entity_id, Ok(value));
                    continue;
                }
                Ok(None) => {}
                Err(_) => {
                    warn!(entity_id, "request lookup panicked");
                    respond(responder, entity_id, Err(DispatchError::Panicked(entity_id)));
                    continue;
                }
            }
        }

        let wait = lock_state(&state)
            .last_dispatch
            .map(|last| min_spacing.saturating_sub(last.elapsed()))
            .unwrap_or(Duration::ZERO);
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "spacing out next dispatch");
            scheduler.wait(wait).await;
        }
        lock_state(&state).last_dispatch = Some(Instant::now());

        let outcome = AssertUnwindSafe(async move { producer(entity_id).await })
            .catch_unwind()
            .await;

        let outcome = match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                warn!(entity_id, error = %error, "request failed");
                Err(DispatchError::Producer(error))
            }
            Err(_) => {
                warn!(entity_id, "request producer panicked");
                Err(DispatchError::Panicked(entity_id))
            }
        };

        respond(responder, entity_id, outcome);
    }
}

fn respond<T>(
    responder: oneshot::Sender<Result<T, DispatchError>>,
    entity_id: u32,
    outcome: Result<T, DispatchError>,
) {
    if responder.send(outcome).is_err() {
        debug!(entity_id, "caller stopped waiting for result");
    }
}

/// Outcome of an enqueued request
pub struct Pending<T> {
    receiver: oneshot::Receiver<Result<T, DispatchError>>,
}

impl<T> Future for Pending<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DispatchError::Abandoned)))
    }
}
