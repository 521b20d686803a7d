//! Replaying multicast cells for store state.
//!
//! A [`ReplayCell`] holds the current value of some piece of store state and
//! fans every change out to all attached [`Subscription`]s. A new
//! subscription first yields the value current at the moment it subscribed,
//! then every later value in publish order.
//!
//! Publishing and subscribing take the same lock, so a subscriber can never
//! miss a value published between reading the current value and attaching
//! to the change channel, nor see one twice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Number of unread values a subscriber may fall behind before it starts
/// skipping the oldest ones.
pub const DEFAULT_CAPACITY: usize = 64;

/// A value with change notifications that replays its current value to new
/// subscribers.
pub struct ReplayCell<T> {
    inner: Mutex<CellState<T>>,
}

struct CellState<T> {
    current: T,
    sender: broadcast::Sender<T>,
}

impl<T> ReplayCell<T>
where
    T: Clone + Send + 'static,
{
    /// Create a cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    /// Create a cell whose subscribers may lag by up to `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(initial: T, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Mutex::new(CellState {
                current: initial,
                sender,
            }),
        }
    }

    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.lock().current.clone()
    }

    /// Replace the current value and notify every subscriber.
    pub fn publish(&self, value: T) {
        let mut state = self.lock();
        state.current = value.clone();
        // No receivers is fine: the value is still replayed to later subscribers.
        let _ = state.sender.send(value);
    }

    /// Attach a new subscriber.
    pub fn subscribe(&self) -> Subscription<T> {
        let state = self.lock();
        Subscription {
            replay: Some(state.current.clone()),
            receiver: state.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().sender.receiver_count()
    }

    fn lock(&self) -> MutexGuard<'_, CellState<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ReplayCell<T>
where
    T: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for ReplayCell<T>
where
    T: Clone + std::fmt::Debug + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayCell")
            .field("current", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One subscriber's view of a [`ReplayCell`].
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// detaches it.
pub struct Subscription<T> {
    replay: Option<T>,
    receiver: broadcast::Receiver<T>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + 'static,
{
    /// Wait for the next value.
    ///
    /// Returns `None` once the cell has been dropped and every published
    /// value has been delivered.
    pub async fn next(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "subscriber lagged, skipping oldest values");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next value if one is already available.
    pub fn try_next(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "subscriber lagged, skipping oldest values");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Detach from the cell.
    pub fn unsubscribe(self) {}

    /// Adapt into a [`Stream`] of values.
    pub fn into_stream(mut self) -> impl Stream<Item = T> + Send {
        async_stream::stream! {
            while let Some(value) = self.next().await {
                yield value;
            }
        }
    }
}
