// ── Polling data synchronizer ──
//
// Re-fetches a list on a fixed cadence and hands each result over whole.
// Ticks never wait for earlier fetches, so fetches may overlap; every
// fetch carries its issue number and a completion older than the newest
// delivered one is dropped. Cancellation stops the timer and silences
// fetches still in flight.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_core::Stream;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::CoreError;

/// Smallest interval the timer accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

// ── Delivery gate ────────────────────────────────────────────────────

struct Delivery {
    cancelled: bool,
    /// Issue number of the newest result handed to a callback.
    last_delivered: u64,
}

struct Shared<U, R> {
    delivery: Mutex<Delivery>,
    cancel: CancellationToken,
    on_update: U,
    on_error: R,
}

impl<U, R> Shared<U, R> {
    fn lock(&self) -> std::sync::MutexGuard<'_, Delivery> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the matching callback unless cancelled or superseded. Callbacks
    /// run under the delivery lock, so `cancel()` waits for one in progress.
    fn deliver<T, E>(&self, seq: u64, result: Result<T, E>)
    where
        U: Fn(T),
        R: Fn(E),
    {
        let mut state = self.lock();
        if state.cancelled || self.cancel.is_cancelled() {
            trace!(seq, "poll result after cancel, dropped");
            return;
        }
        if seq < state.last_delivered {
            trace!(seq, newest = state.last_delivered, "stale poll result, dropped");
            return;
        }
        state.last_delivered = seq;
        match result {
            Ok(value) => (self.on_update)(value),
            Err(err) => (self.on_error)(err),
        }
    }
}

trait Cancel: Send + Sync {
    fn stop(&self);
}

impl<U: Send + Sync, R: Send + Sync> Cancel for Shared<U, R> {
    fn stop(&self) {
        self.cancel.cancel();
        self.lock().cancelled = true;
    }
}

// ── PollHandle ───────────────────────────────────────────────────────

/// Owner of a running poll subscription. Dropping it cancels.
pub struct PollHandle {
    shared: Arc<dyn Cancel>,
    cancel: CancellationToken,
}

impl PollHandle {
    /// Stop polling. Once this returns, neither callback runs again, even
    /// for fetches still in flight.
    ///
    /// Must not be called from inside one of this subscription's own
    /// callbacks.
    pub fn cancel(&self) {
        self.shared.stop();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Poll `fetch` every `interval`, starting immediately.
///
/// Each success goes to `on_update` with the full result; each failure to
/// `on_error`, and the schedule carries on unchanged. Must be called
/// inside a tokio runtime.
pub fn start_polling<T, E, F, Fut, U, R>(
    fetch: F,
    interval: Duration,
    on_update: U,
    on_error: R,
) -> PollHandle
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    U: Fn(T) + Send + Sync + 'static,
    R: Fn(E) + Send + Sync + 'static,
{
    spawn_poller(CancellationToken::new(), fetch, interval, on_update, on_error)
}

/// [`start_polling`] with a caller-supplied token, so callbacks can stop
/// their own subscription by cancelling it.
fn spawn_poller<T, E, F, Fut, U, R>(
    cancel: CancellationToken,
    fetch: F,
    interval: Duration,
    on_update: U,
    on_error: R,
) -> PollHandle
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    U: Fn(T) + Send + Sync + 'static,
    R: Fn(E) + Send + Sync + 'static,
{
    let shared = Arc::new(Shared {
        delivery: Mutex::new(Delivery {
            cancelled: false,
            last_delivered: 0,
        }),
        cancel: cancel.clone(),
        on_update,
        on_error,
    });

    let timer_shared = Arc::clone(&shared);
    let timer_cancel = cancel.clone();
    let period = interval.max(MIN_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut seq: u64 = 0;

        loop {
            tokio::select! {
                biased;
                () = timer_cancel.cancelled() => break,
                _ = ticker.tick() => {
                    seq += 1;
                    trace!(seq, "poll tick");
                    let pending = fetch();
                    let shared = Arc::clone(&timer_shared);
                    let cancel = timer_cancel.clone();
                    let issued = seq;
                    tokio::spawn(async move {
                        let result = tokio::select! {
                            biased;
                            () = cancel.cancelled() => return,
                            result = pending => result,
                        };
                        shared.deliver(issued, result);
                    });
                }
            }
        }
        debug!(ticks = seq, "poller stopped");
    });

    PollHandle { shared, cancel }
}

// ── ListFeed ─────────────────────────────────────────────────────────

/// What a list view shows: the latest list and the latest failure.
#[derive(Debug)]
pub struct FeedState<T> {
    /// Most recent successful result; empty until the first one lands.
    pub items: Arc<Vec<T>>,
    /// Most recent failure; cleared by the next success.
    pub error: Option<Arc<CoreError>>,
    /// When `items` was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for FeedState<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            error: None,
            updated_at: None,
        }
    }
}

/// A polled list kept in a `watch` channel.
///
/// An `Unauthenticated` failure stops the feed: the session is gone and
/// the view must leave. Other failures are recorded and polling goes on.
pub struct ListFeed<T: Send + Sync + 'static> {
    receiver: watch::Receiver<FeedState<T>>,
    handle: PollHandle,
}

impl<T: Send + Sync + 'static> ListFeed<T> {
    pub fn spawn<F, Fut>(fetch: F, interval: Duration) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, CoreError>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(FeedState::default());
        let sender = Arc::new(sender);
        let cancel = CancellationToken::new();

        let update_tx = Arc::clone(&sender);
        let on_update = move |items: Vec<T>| {
            update_tx.send_modify(|state| {
                state.items = Arc::new(items);
                state.error = None;
                state.updated_at = Some(Utc::now());
            });
        };

        let error_tx = sender;
        let error_cancel = cancel.clone();
        let on_error = move |err: CoreError| {
            let fatal = err.is_unauthenticated();
            if fatal {
                debug!("feed stopped: session expired");
                error_cancel.cancel();
            } else {
                warn!(error = %err, "poll failed");
            }
            error_tx.send_modify(|state| state.error = Some(Arc::new(err)));
        };

        let handle = spawn_poller(cancel, fetch, interval, on_update, on_error);
        Self { receiver, handle }
    }

    /// Snapshot of the latest list.
    pub fn current(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.receiver.borrow().items)
    }

    pub fn state(&self) -> FeedState<T> {
        self.receiver.borrow().clone()
    }

    pub fn last_error(&self) -> Option<Arc<CoreError>> {
        self.receiver.borrow().error.clone()
    }

    /// Wait for the next update or failure.
    /// Returns `None` once the feed can no longer change.
    pub async fn changed(&mut self) -> Option<FeedState<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Convert into a `Stream` of states. The feed keeps polling for as
    /// long as the stream lives.
    pub fn into_stream(self) -> FeedStream<T> {
        FeedStream {
            inner: WatchStream::new(self.receiver),
            _handle: self.handle,
        }
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for ListFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListFeed")
            .field("items", &self.receiver.borrow().items.len())
            .field("handle", &self.handle)
            .finish()
    }
}

/// `Stream` adapter over a [`ListFeed`]. Yields the current state first.
pub struct FeedStream<T: Send + Sync + 'static> {
    inner: WatchStream<FeedState<T>>,
    _handle: PollHandle,
}

impl<T: Send + Sync + 'static> Stream for FeedStream<T> {
    type Item = FeedState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
