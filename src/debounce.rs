//! Debounced, cancellable query slots.
//!
//! A [`QuerySlot`] holds at most one lookup. Scheduling a new lookup aborts
//! whatever the slot was doing, whether it was still waiting out its quiet
//! period or already talking to the source, and only the newest lookup may
//! publish a result. Completion of a superseded task is a no-op.
//!
//! ```text
//! schedule("a")   ──▶ Pending ─┐ abort
//! schedule("an")  ──▶ Pending ─┤ abort
//! schedule("anc") ──▶ Pending ──── 800ms ──▶ lookup ──▶ Ready / Failed
//! ```
//!
//! State is published on a `tokio::sync::watch` channel so a UI can await
//! changes instead of polling.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::QueryError;
use crate::facade::QueryState;

/// Quiet period for search-as-you-type.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Default)]
struct SlotInner {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// A single-flight, cancellable lookup holder.
pub struct QuerySlot<T> {
    inner: Arc<Mutex<SlotInner>>,
    state: Arc<watch::Sender<QueryState<T>>>,
}

impl<T> QuerySlot<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(QueryState::Idle);
        Self {
            inner: Arc::new(Mutex::new(SlotInner::default())),
            state: Arc::new(tx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bump the generation and abort the outstanding task, if any.
    fn cancel_locked(inner: &mut SlotInner) -> u64 {
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.generation
    }

    /// Run `lookup` after `delay`, replacing anything already scheduled or
    /// in flight. Returns the generation assigned to this lookup.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, lookup: F) -> u64
    where
        F: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let mut inner = self.lock();
        let generation = Self::cancel_locked(&mut inner);
        self.state.send_replace(QueryState::Pending);

        let slot = self.inner.clone();
        let state = self.state.clone();
        inner.task = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = lookup.await;

            let mut inner = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.generation != generation {
                tracing::trace!(generation, "discarding superseded lookup result");
                return;
            }
            inner.task = None;
            state.send_replace(result.into());
        }));

        generation
    }

    /// Abort any outstanding lookup and return the slot to `Idle`.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        Self::cancel_locked(&mut inner);
        self.state.send_replace(QueryState::Idle);
    }

    /// `true` while a lookup is scheduled or in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> QuerySlot<T> {
    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }
}

impl<T> Default for QuerySlot<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for QuerySlot<T> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
    }
}
