//! Per-launch race state machine.
//!
//! ```text
//! Idle ──begin──▶ Racing ──timer──────────────▶ Resolved(Fallback)
//!                    └────hidden, past floor──▶ Resolved(Native)
//! ```
//!
//! `Resolved` is terminal: later timer or visibility events are ignored. The
//! machine holds no I/O; the executor feeds it events and performs the
//! navigation each transition calls for.
//!
//! Leaving the foreground is only a proxy for "the app opened". Switching apps
//! by hand during the race window reads as a native launch, and an app that
//! opens without backgrounding the page reads as a fallback. Neither can be
//! told apart from the page, so neither is treated as a defect.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use deeplaunch_core::prelude::*;

/// Default window the native app has to take the foreground.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(2500);

/// Hides sooner than this after the attempt are treated as a flash caused by
/// the attempt itself.
pub const DEFAULT_PLAUSIBILITY_FLOOR: Duration = Duration::from_millis(150);

/// Who handles the fallback when an Android intent URL loses the race.
///
/// Intent URLs embed their own `S.browser_fallback_url`, which the browser
/// follows when the target package is missing. Both mechanisms are kept; this
/// picks which one acts on timer expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentFallbackPolicy {
    /// The timer opens the fallback URL for intents as for any other scheme;
    /// the embedded fallback only matters if the launcher is torn down first.
    #[default]
    Layered,
    /// On timer expiry for an intent URL, open nothing and leave the browser's
    /// embedded fallback in charge.
    IntentOnly,
}

/// Tunables for a single race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceConfig {
    pub fallback_timeout: Duration,
    pub plausibility_floor: Duration,
    pub intent_policy: IntentFallbackPolicy,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            plausibility_floor: DEFAULT_PLAUSIBILITY_FLOOR,
            intent_policy: IntentFallbackPolicy::default(),
        }
    }
}

/// Which source won the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceResolution {
    Native,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceState {
    Idle,
    Racing { started_at: Instant },
    Resolved(RaceResolution),
}

/// State for exactly one launch attempt.
#[derive(Debug)]
pub struct LaunchRace {
    state: RaceState,
    plausibility_floor: Duration,
}

impl LaunchRace {
    pub fn new(config: &RaceConfig) -> Self {
        Self {
            state: RaceState::Idle,
            plausibility_floor: config.plausibility_floor,
        }
    }

    /// Enter `Racing`. Call only after the native attempt has been issued.
    ///
    /// Returns false if the race was already started or resolved.
    pub fn begin(&mut self, now: Instant) -> bool {
        match self.state {
            RaceState::Idle => {
                self.state = RaceState::Racing { started_at: now };
                true
            }
            _ => false,
        }
    }

    /// The page left the foreground at `now`.
    pub fn on_hidden(&mut self, now: Instant) -> Option<RaceResolution> {
        let RaceState::Racing { started_at } = self.state else {
            return None;
        };

        let elapsed = now.saturating_duration_since(started_at);
        if elapsed <= self.plausibility_floor {
            trace!(
                "Ignoring hide {:?} after attempt (floor {:?})",
                elapsed,
                self.plausibility_floor
            );
            return None;
        }

        self.state = RaceState::Resolved(RaceResolution::Native);
        Some(RaceResolution::Native)
    }

    /// The fallback timer fired.
    pub fn on_timer(&mut self) -> Option<RaceResolution> {
        match self.state {
            RaceState::Racing { .. } => {
                self.state = RaceState::Resolved(RaceResolution::Fallback);
                Some(RaceResolution::Fallback)
            }
            _ => None,
        }
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RaceState::Resolved(_))
    }

    pub fn resolution(&self) -> Option<RaceResolution> {
        match self.state {
            RaceState::Resolved(r) => Some(r),
            _ => None,
        }
    }
}
