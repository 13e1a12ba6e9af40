// src/feed/poller.rs
//! Polling subscription: one timer task per feed, one fetch cycle per tick.
//!
//! Cycles may overlap when a response is slower than the poll interval. Each
//! cycle takes a generation token; its result is applied only while that token
//! is still the latest issued and the subscription has not been stopped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::fetcher::FeedFetcher;
use crate::feed::types::{FeedSource, FetchState};
use crate::feed::{fetch_records, record_stale};

struct Shared<T> {
    source: FeedSource<T>,
    fetcher: Arc<dyn FeedFetcher>,
    tx: watch::Sender<FetchState<T>>,
    /// Records of the last non-loading state; written under the channel lock.
    retained: Mutex<Vec<T>>,
    generation: AtomicU64,
    stopped: AtomicBool,
}

impl<T: Clone> Shared<T> {
    /// Apply `next` if `token` is still current. The check runs under the
    /// channel's write lock, so it cannot interleave with `stop`.
    fn publish(&self, token: u64, next: FetchState<T>) -> bool {
        self.tx.send_if_modified(|current| {
            if self.stopped.load(Ordering::SeqCst)
                || self.generation.load(Ordering::SeqCst) != token
            {
                return false;
            }
            if !next.is_loading() {
                *self
                    .retained
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = next.records().to_vec();
            }
            *current = next;
            true
        })
    }
}

async fn run_cycle<T>(shared: Arc<Shared<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    if shared.stopped.load(Ordering::SeqCst) {
        return;
    }
    let token = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
    shared.publish(token, FetchState::Loading);

    let next = match fetch_records(shared.fetcher.as_ref(), &shared.source).await {
        Ok(records) => FetchState::Ready {
            records,
            fetched_at: Utc::now(),
        },
        Err(e) => FetchState::Error {
            message: format!("Failed to load {}: {e}", shared.source.name),
            fallback: shared.source.fallback.clone(),
        },
    };

    if !shared.publish(token, next) {
        record_stale(shared.source.name);
        tracing::debug!(
            target: "feed",
            feed = shared.source.name,
            token,
            "discarded stale response"
        );
    }
}

/// Handle to a running feed. Dropping it stops polling.
pub struct Subscription<T> {
    shared: Arc<Shared<T>>,
    rx: watch::Receiver<FetchState<T>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Issue one fetch now and then one every `source.poll_interval`.
///
/// Must be called from within a Tokio runtime.
pub fn start<T>(source: FeedSource<T>, fetcher: Arc<dyn FeedFetcher>) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(FetchState::Loading);
    let period = source.poll_interval.max(Duration::from_millis(1));

    tracing::info!(
        target: "feed",
        feed = source.name,
        url = %source.url,
        interval_ms = period.as_millis() as u64,
        "feed polling started"
    );

    let shared = Arc::new(Shared {
        source,
        fetcher,
        tx,
        retained: Mutex::new(Vec::new()),
        generation: AtomicU64::new(0),
        stopped: AtomicBool::new(false),
    });

    let timer_shared = Arc::clone(&shared);
    let timer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tokio::spawn(run_cycle(Arc::clone(&timer_shared)));
        }
    });

    Subscription {
        shared,
        rx,
        timer: Mutex::new(Some(timer)),
    }
}

impl<T> Subscription<T> {
    pub fn name(&self) -> &'static str {
        self.shared.source.name
    }

    pub fn source(&self) -> &FeedSource<T> {
        &self.shared.source
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    /// Cancel the timer and ignore any response still in flight. Idempotent.
    ///
    /// The first call wakes receivers so that `settled` waiters can return.
    pub fn stop(&self) {
        let mut first = false;
        self.shared.tx.send_if_modified(|_| {
            first = !self.shared.stopped.swap(true, Ordering::SeqCst);
            first
        });

        let handle = self
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(h) = handle {
            h.abort();
        }

        if first {
            tracing::info!(target: "feed", feed = self.name(), "feed polling stopped");
        }
    }
}

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn state(&self) -> FetchState<T> {
        self.rx.borrow().clone()
    }

    /// Receiver that observes every state change of this feed.
    pub fn watch(&self) -> watch::Receiver<FetchState<T>> {
        self.rx.clone()
    }

    /// Records to show right now: the current ones, or while a cycle is in
    /// flight, those of the last ready or error state.
    pub fn display_records(&self) -> Vec<T> {
        let current = self.rx.borrow();
        if current.is_loading() {
            self.shared
                .retained
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        } else {
            current.records().to_vec()
        }
    }

    /// Wait until the feed leaves `Loading` and return that state. Returns
    /// the current state as-is once the subscription is stopped.
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.rx.clone();
        let stopped = &self.shared.stopped;
        let settled = match rx
            .wait_for(|s| !s.is_loading() || stopped.load(Ordering::SeqCst))
            .await
        {
            Ok(state) => (*state).clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Run one fetch cycle immediately, outside the regular schedule.
    pub async fn refresh(&self) {
        run_cycle(Arc::clone(&self.shared)).await;
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
