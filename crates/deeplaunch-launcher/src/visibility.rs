//! Page-visibility signal.
//!
//! The host exposes a single global foreground/background signal. Every launch
//! attaches its own [`VisibilityObserver`]; the observer detaches itself when
//! dropped, so a resolved launch can never leave a listener behind and one
//! launch's observer can never be removed by another.
//!
//! Outside a browser the signal comes from whatever wraps the CLI; see
//! [`pump_lines`].

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

use deeplaunch_core::prelude::*;

/// Foreground state of the launching surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

impl std::str::FromStr for VisibilityState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" | "foreground" => Ok(VisibilityState::Visible),
            "hidden" | "background" => Ok(VisibilityState::Hidden),
            other => Err(format!("unknown visibility state '{}'", other)),
        }
    }
}

struct HubInner {
    observers: Mutex<HashMap<u64, mpsc::UnboundedSender<VisibilityState>>>,
    state: Mutex<VisibilityState>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single global observation point for visibility changes.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone)]
pub struct VisibilityHub {
    inner: Arc<HubInner>,
}

impl VisibilityHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                observers: Mutex::new(HashMap::new()),
                state: Mutex::new(VisibilityState::Visible),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Attach a private observer. It receives every change published after
    /// this call until it is dropped.
    pub fn observe(&self) -> VisibilityObserver {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.observers).insert(id, tx);
        trace!("Visibility observer {} attached", id);

        VisibilityObserver {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Record a new visibility state and dispatch it to attached observers.
    ///
    /// Repeating the current state is not a change and is not dispatched.
    /// Returns the number of observers notified.
    pub fn publish(&self, state: VisibilityState) -> usize {
        {
            let mut current = lock(&self.inner.state);
            if *current == state {
                return 0;
            }
            *current = state;
        }

        let observers = lock(&self.inner.observers);
        let delivered = observers
            .values()
            .filter(|tx| tx.send(state).is_ok())
            .count();
        debug!("Visibility -> {:?} ({} observers)", state, delivered);
        delivered
    }

    pub fn current(&self) -> VisibilityState {
        *lock(&self.inner.state)
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }
}

/// Feed line-delimited visibility reports (`hidden` / `visible`) from
/// `reader` into `hub` until end of input. Blocking; run it on its own thread.
///
/// Blank and unrecognised lines are skipped. Returns the number of
/// recognised reports.
pub fn pump_lines<R: BufRead>(reader: R, hub: &VisibilityHub) -> usize {
    let mut reports = 0;

    for line in reader.lines() {
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match line.parse::<VisibilityState>() {
                Ok(state) => {
                    reports += 1;
                    hub.publish(state);
                }
                Err(e) => warn!("Ignoring visibility report: {}", e),
            },
            Err(e) => {
                warn!("Failed to read visibility input: {}", e);
                break;
            }
        }
    }

    debug!("Visibility input closed after {} reports", reports);
    reports
}

impl Default for VisibilityHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VisibilityHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityHub")
            .field("state", &self.current())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// One launch's private subscription to the hub.
#[derive(Debug)]
pub struct VisibilityObserver {
    id: u64,
    rx: mpsc::UnboundedReceiver<VisibilityState>,
    hub: Weak<HubInner>,
}

impl VisibilityObserver {
    /// Wait for the next visibility change.
    ///
    /// Returns `None` once the hub is gone and no changes remain queued.
    pub async fn changed(&mut self) -> Option<VisibilityState> {
        self.rx.recv().await
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub.observers).remove(&self.id);
            trace!("Visibility observer {} detached", self.id);
        }
    }
}
