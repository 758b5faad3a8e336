//! # deeplaunch-launcher - Launch Execution
//!
//! Carries out a [`LaunchPlan`](deeplaunch_core::LaunchPlan): opens web plans
//! directly and runs the native-vs-web race for hybrid plans.
//!
//! Depends on [`deeplaunch_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Execution
//! - [`LaunchExecutor`] - Executes plans; one independent race per call, or an
//!   unraced hand-off when nothing reports visibility
//!
//! ### Race
//! - [`LaunchRace`] - `Idle → Racing → Resolved` state machine for one launch
//! - [`RaceConfig`] - Fallback timeout, plausibility floor, intent policy
//! - [`IntentFallbackPolicy`] - Who handles the fallback for Android intents
//!
//! ### Host Seams
//! - [`Navigator`] - Native attempt / open URL; [`SystemNavigator`] and [`DryRunNavigator`]
//! - [`VisibilityHub`] - Global foreground signal with per-launch observers;
//!   [`pump_lines`] feeds it from line-delimited input
//! - [`Clock`] - Injected time source; [`TokioClock`] in production

pub mod clock;
pub mod executor;
pub mod navigator;
pub mod race;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod visibility;

pub use clock::{Clock, LocalClock, TokioClock};
pub use executor::LaunchExecutor;
pub use navigator::{DryRunNavigator, NavigationStatus, Navigator, SystemNavigator};
pub use race::{
    IntentFallbackPolicy, LaunchRace, RaceConfig, RaceResolution, RaceState,
    DEFAULT_FALLBACK_TIMEOUT, DEFAULT_PLAUSIBILITY_FLOOR,
};
pub use visibility::{pump_lines, VisibilityHub, VisibilityObserver, VisibilityState};
