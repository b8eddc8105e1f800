//! # Debounce
//!
//! A single-slot delayed task. [`Debouncer::schedule`] arms a timer carrying a
//! value; scheduling again before it fires cancels the pending timer and
//! starts over (last write wins). When the quiet period elapses the value is
//! delivered through [`Debouncer::fired`].
//!
//! Every schedule bumps a generation counter and the timer tags its value with
//! the generation it was armed under. A value that fired but was superseded
//! before the consumer got to it is dropped on receipt, so at most one value
//! per burst of input ever comes out.
//!
//! The debouncer does not run the action itself. The owner awaits
//! [`Debouncer::fired`] from its own event loop and does the work there,
//! keeping all state mutation on that one task.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Quiet period before a search is dispatched.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<(u64, T)>,
    rx: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer with `value`, replacing anything still pending.
    pub fn schedule(&mut self, value: T) {
        self.cancel();
        let generation = self.generation;
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();
        trace!(generation, delay = ?self.delay, "debounce armed");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The receiver lives as long as the debouncer; a send error only
            // means the owner is gone.
            let _ = tx.send((generation, value));
        }));
    }

    /// Drops the pending value, if any. Values already delivered are not
    /// affected.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Waits for the next value whose quiet period elapsed without being
    /// superseded. Pends forever while nothing is scheduled.
    pub async fn fired(&mut self) -> T {
        loop {
            // `self` holds a sender, so the channel never closes.
            let Some((generation, value)) = self.rx.recv().await else {
                return std::future::pending::<T>().await;
            };
            if generation == self.generation {
                self.pending = None;
                return value;
            }
            trace!(generation, current = self.generation, "stale debounce dropped");
        }
    }

    /// Non-blocking variant of [`Debouncer::fired`].
    pub fn try_fired(&mut self) -> Option<T> {
        while let Ok((generation, value)) = self.rx.try_recv() {
            if generation == self.generation {
                self.pending = None;
                return Some(value);
            }
        }
        None
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
