pub mod client;
pub mod provider;

pub use client::{CustomQuery, HttpOddsSource, DEFAULT_API_BASE_URL};
pub use provider::{OddsApi, DEFAULT_TRIALS};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::OddsSnapshot;

/// Latest state of a polled odds feed.
///
/// A failed fetch sets `error` but leaves `snapshot` alone, so consumers keep
/// showing the last good data with the error alongside it.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub snapshot: Option<Arc<OddsSnapshot>>,
    /// True only while a foreground fetch is outstanding
    pub loading: bool,
    pub error: Option<String>,
}

type UpdateFn = Box<dyn Fn(Arc<OddsSnapshot>) + Send + Sync>;
type ErrorFn = Box<dyn Fn(String) + Send + Sync>;

/// Serializes result delivery against `stop()`. Once `stop()` returns, no
/// callback runs and the feed state no longer changes. A `stop()` issued from
/// inside a callback only raises the flag; the delivery in progress on that
/// thread is the last one.
struct Delivery {
    stopped: AtomicBool,
    gate: Mutex<()>,
    delivering_on: Mutex<Option<ThreadId>>,
    state: watch::Sender<FeedState>,
    on_update: UpdateFn,
    on_error: ErrorFn,
}

impl Delivery {
    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn begin(&self, foreground: bool) {
        let _gate = Self::lock(&self.gate);
        if !self.is_stopped() && foreground {
            self.state.send_modify(|s| s.loading = true);
        }
    }

    fn finish(&self, result: crate::error::Result<OddsSnapshot>, foreground: bool) {
        let _gate = Self::lock(&self.gate);
        if self.is_stopped() {
            debug!("Dropping odds result delivered after stop");
            return;
        }
        *Self::lock(&self.delivering_on) = Some(thread::current().id());
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.state.send_modify(|s| {
                    s.snapshot = Some(Arc::clone(&snapshot));
                    s.error = None;
                    if foreground {
                        s.loading = false;
                    }
                });
                (self.on_update)(snapshot);
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Odds fetch failed: {}", message);
                self.state.send_modify(|s| {
                    s.error = Some(message.clone());
                    if foreground {
                        s.loading = false;
                    }
                });
                (self.on_error)(message);
            }
        }
        *Self::lock(&self.delivering_on) = None;
    }

    /// Returns false if already stopped.
    fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        let reentrant = *Self::lock(&self.delivering_on) == Some(thread::current().id());
        if !reentrant {
            // Wait out a delivery running on another thread.
            drop(Self::lock(&self.gate));
        }
        true
    }
}

/// Owned handle to a running poller. Dropping it stops polling.
pub struct PollHandle {
    api: Arc<dyn OddsApi>,
    delivery: Arc<Delivery>,
    state_rx: watch::Receiver<FeedState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop all future polls and silence fetches still in flight. After this
    /// returns neither callback fires again. Safe to call (or drop the handle)
    /// from inside a callback.
    pub fn stop(&self) {
        if self.delivery.stop() {
            self.task.abort();
            info!("Odds poller stopped ({})", self.api.name());
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.delivery.is_stopped()
    }

    /// Current feed state.
    pub fn state(&self) -> FeedState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that wakes on every feed state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state_rx.clone()
    }

    /// Fetch now, outside the interval schedule. A foreground refresh raises
    /// the loading flag; a background one does not.
    pub fn refresh(&self, foreground: bool) {
        if self.is_stopped() {
            return;
        }
        spawn_fetch(Arc::clone(&self.api), Arc::clone(&self.delivery), foreground);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start polling `api` for today's snapshot.
///
/// One foreground fetch is issued immediately, then a background fetch every
/// `interval`. Fetches may overlap; whichever finishes last wins. Failures
/// are reported through `on_error` and never stop the poller.
///
/// Must be called from within a Tokio runtime. A zero `interval` is treated
/// as one millisecond.
pub fn start_polling<U, E>(
    api: Arc<dyn OddsApi>,
    interval: Duration,
    on_update: U,
    on_error: E,
) -> PollHandle
where
    U: Fn(Arc<OddsSnapshot>) + Send + Sync + 'static,
    E: Fn(String) + Send + Sync + 'static,
{
    let period = interval.max(Duration::from_millis(1));
    let (state_tx, state_rx) = watch::channel(FeedState {
        loading: true,
        ..FeedState::default()
    });
    let delivery = Arc::new(Delivery {
        stopped: AtomicBool::new(false),
        gate: Mutex::new(()),
        delivering_on: Mutex::new(None),
        state: state_tx,
        on_update: Box::new(on_update),
        on_error: Box::new(on_error),
    });

    info!("Odds poller started ({}, interval={:?})", api.name(), period);

    let task = {
        let api = Arc::clone(&api);
        let delivery = Arc::clone(&delivery);
        tokio::spawn(async move {
            spawn_fetch(Arc::clone(&api), Arc::clone(&delivery), true);

            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if delivery.is_stopped() {
                    break;
                }
                spawn_fetch(Arc::clone(&api), Arc::clone(&delivery), false);
            }
        })
    };

    PollHandle {
        api,
        delivery,
        state_rx,
        task,
    }
}

fn spawn_fetch(api: Arc<dyn OddsApi>, delivery: Arc<Delivery>, foreground: bool) {
    tokio::spawn(async move {
        delivery.begin(foreground);
        let result = api.fetch_today_snapshot().await;
        delivery.finish(result, foreground);
    });
}
