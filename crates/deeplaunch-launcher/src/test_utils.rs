//! Test utilities for the launcher
//!
//! Provides a navigator that records what it was asked to do, plus ready-made
//! Netflix plans for driving the race.

use std::sync::{Arc, Mutex, PoisonError};

use deeplaunch_core::LaunchPlan;

use crate::navigator::{NavigationStatus, Navigator};

/// Which navigator operation was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    NativeAttempt,
    Open,
}

/// Navigator that records every call in order.
///
/// Clones share the same history, so a clone can be handed to an executor and
/// the original inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<(NavigationKind, String)>>>,
    block_open: bool,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A navigator whose `open` calls are refused by the host.
    pub fn blocking() -> Self {
        Self {
            block_open: true,
            ..Self::default()
        }
    }

    pub fn history(&self) -> Vec<(NavigationKind, String)> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs passed to operations of `kind`, in call order.
    pub fn urls(&self, kind: NavigationKind) -> Vec<String> {
        self.history()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, url)| url)
            .collect()
    }

    fn record(&self, kind: NavigationKind, url: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, url.to_string()));
    }
}

impl Navigator for RecordingNavigator {
    fn attempt_native(&self, url: &str) {
        self.record(NavigationKind::NativeAttempt, url);
    }

    fn open(&self, url: &str) -> NavigationStatus {
        self.record(NavigationKind::Open, url);
        if self.block_open {
            NavigationStatus::Blocked
        } else {
            NavigationStatus::Opened
        }
    }
}

/// Hybrid Netflix plan using the custom scheme.
pub fn hybrid_plan(id: &str) -> LaunchPlan {
    LaunchPlan::hybrid(
        format!("nflx://www.netflix.com/title/{id}"),
        format!("https://www.netflix.com/title/{id}"),
        "Opening in the Netflix app...",
        "Netflix",
    )
}

/// Hybrid Netflix plan using the Android intent form.
pub fn intent_plan(id: &str) -> LaunchPlan {
    LaunchPlan::hybrid(
        format!(
            "intent://www.netflix.com/title/{id}#Intent;scheme=nflx;package=com.netflix.mediaclient;\
             S.browser_fallback_url=https%3A%2F%2Fwww.netflix.com%2Ftitle%2F{id};end"
        ),
        format!("https://www.netflix.com/title/{id}"),
        "Opening in the Netflix app...",
        "Netflix",
    )
}

/// Web-only plan for `url`.
pub fn web_plan(url: &str) -> LaunchPlan {
    LaunchPlan::web(url, "Opening in your browser...", "Netflix")
}
