//! Launch execution.
//!
//! Web plans open their URL and finish. Hybrid plans run the race:
//!
//! 1. Issue the native attempt (fire-and-forget, cannot fail)
//! 2. Arm the fallback timer and attach a private visibility observer
//! 3. Whichever source resolves the [`LaunchRace`] first wins; the other is
//!    dropped with the race's stack frame
//! 4. Perform the winning side's navigation, if any
//!
//! Each call to [`LaunchExecutor::execute`] owns its race, timer and observer,
//! so concurrent launches through the same executor cannot resolve each other.
//!
//! The race is only meaningful when something publishes to the
//! [`VisibilityHub`]. Hosts with no such source use
//! [`LaunchExecutor::hand_off`], which issues the native attempt and stops.

use std::time::Duration;

use deeplaunch_core::prelude::*;
use deeplaunch_core::{LaunchDisposition, LaunchMethod, LaunchOutcome, LaunchPlan};

use crate::clock::{Clock, TokioClock};
use crate::navigator::{NavigationStatus, Navigator};
use crate::race::{IntentFallbackPolicy, LaunchRace, RaceConfig, RaceResolution};
use crate::visibility::{VisibilityHub, VisibilityState};

/// Performs launch plans against a host [`Navigator`].
#[derive(Debug)]
pub struct LaunchExecutor<N, C = TokioClock> {
    navigator: N,
    clock: C,
    visibility: VisibilityHub,
    config: RaceConfig,
}

impl<N: Navigator> LaunchExecutor<N, TokioClock> {
    pub fn new(navigator: N, visibility: VisibilityHub, config: RaceConfig) -> Self {
        Self::with_clock(navigator, TokioClock, visibility, config)
    }
}

impl<N: Navigator, C: Clock + Sync> LaunchExecutor<N, C> {
    pub fn with_clock(navigator: N, clock: C, visibility: VisibilityHub, config: RaceConfig) -> Self {
        Self {
            navigator,
            clock,
            visibility,
            config,
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn visibility(&self) -> &VisibilityHub {
        &self.visibility
    }

    /// Execute a plan. Always yields a definite outcome; navigation failures
    /// are folded into `native_launched == false`.
    #[instrument(skip_all, fields(platform = %plan.platform_display_name, method = %plan.method))]
    pub async fn execute(&self, plan: &LaunchPlan) -> LaunchOutcome {
        let started_at = self.clock.now();

        let disposition = match plan.method {
            LaunchMethod::Web => match self.navigator.open(&plan.primary_url) {
                NavigationStatus::Opened => LaunchDisposition::Web,
                NavigationStatus::Blocked => LaunchDisposition::Suppressed,
            },
            LaunchMethod::Native => {
                self.navigator.attempt_native(&plan.primary_url);
                LaunchDisposition::Native
            }
            LaunchMethod::Hybrid => self.race(plan).await,
        };

        let outcome = LaunchOutcome::new(
            disposition,
            self.clock.now().saturating_duration_since(started_at),
        );
        info!(
            "Launch finished: {} after {:?}",
            outcome.disposition, outcome.elapsed
        );
        outcome
    }

    /// Execute a plan on a host that cannot report visibility.
    ///
    /// Hybrid plans get their native attempt and resolve as
    /// [`LaunchDisposition::HandedOff`] and the fallback is never opened.
    /// Other plans behave as in [`execute`](Self::execute).
    pub async fn hand_off(&self, plan: &LaunchPlan) -> LaunchOutcome {
        if plan.method != LaunchMethod::Hybrid {
            return self.execute(plan).await;
        }

        debug!("Unobserved native attempt: {}", plan.primary_url);
        self.navigator.attempt_native(&plan.primary_url);
        info!(
            "Handed {} to the native handler without a fallback race",
            plan.platform_display_name
        );
        LaunchOutcome::new(LaunchDisposition::HandedOff, Duration::ZERO)
    }

    async fn race(&self, plan: &LaunchPlan) -> LaunchDisposition {
        let mut race = LaunchRace::new(&self.config);

        // The attempt goes out before the timer and observer exist
        debug!("Native attempt: {}", plan.primary_url);
        self.navigator.attempt_native(&plan.primary_url);
        race.begin(self.clock.now());

        let mut observer = self.visibility.observe();
        let timer = self.clock.sleep(self.config.fallback_timeout);
        tokio::pin!(timer);

        let mut observing = true;
        let resolution = loop {
            tokio::select! {
                _ = &mut timer => {
                    if let Some(resolution) = race.on_timer() {
                        break resolution;
                    }
                }
                change = observer.changed(), if observing => match change {
                    Some(VisibilityState::Hidden) => {
                        if let Some(resolution) = race.on_hidden(self.clock.now()) {
                            break resolution;
                        }
                    }
                    Some(VisibilityState::Visible) => {}
                    None => {
                        debug!("Visibility source closed; waiting on timer only");
                        observing = false;
                    }
                },
            }
        };
        drop(observer);

        match resolution {
            RaceResolution::Native => {
                debug!("Page left the foreground; assuming the app opened");
                LaunchDisposition::Native
            }
            RaceResolution::Fallback => self.fall_back(plan),
        }
    }

    fn fall_back(&self, plan: &LaunchPlan) -> LaunchDisposition {
        if is_intent_url(&plan.primary_url)
            && self.config.intent_policy == IntentFallbackPolicy::IntentOnly
        {
            debug!("Timer expired on intent URL; deferring to its embedded fallback");
            return LaunchDisposition::DeferredToIntent;
        }

        debug!("Timer expired; opening fallback {}", plan.fallback_url);
        match self.navigator.open(&plan.fallback_url) {
            NavigationStatus::Opened => LaunchDisposition::Fallback,
            NavigationStatus::Blocked => {
                warn!("Fallback navigation was blocked: {}", plan.fallback_url);
                LaunchDisposition::Suppressed
            }
        }
    }
}

fn is_intent_url(url: &str) -> bool {
    url.get(..9)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("intent://"))
}
