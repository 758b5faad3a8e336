//! Machine-readable output for `--json`
//!
//! One JSON object per line, each tagged with an `event` field and a
//! millisecond timestamp.

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use deeplaunch_core::{DeviceProfile, LaunchOutcome, LaunchPlan, PlatformDescriptor};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CliEvent<'a> {
    Profile {
        profile: &'a DeviceProfile,
        timestamp: i64,
    },
    Plan {
        plan: &'a LaunchPlan,
        device: &'a DeviceProfile,
        timestamp: i64,
    },
    Outcome {
        outcome: &'a LaunchOutcome,
        status: String,
        timestamp: i64,
    },
    Platform {
        platform: &'a PlatformDescriptor,
        timestamp: i64,
    },
}

impl<'a> CliEvent<'a> {
    pub fn profile(profile: &'a DeviceProfile) -> Self {
        Self::Profile {
            profile,
            timestamp: now(),
        }
    }

    pub fn plan(plan: &'a LaunchPlan, device: &'a DeviceProfile) -> Self {
        Self::Plan {
            plan,
            device,
            timestamp: now(),
        }
    }

    pub fn outcome(outcome: &'a LaunchOutcome, plan: &LaunchPlan) -> Self {
        Self::Outcome {
            outcome,
            status: outcome.status_message(plan),
            timestamp: now(),
        }
    }

    pub fn platform(platform: &'a PlatformDescriptor) -> Self {
        Self::Platform {
            platform,
            timestamp: now(),
        }
    }

    /// Write this event to stdout as one line of JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json).and_then(|()| stdout.flush()) {
            error!("Failed to write event to stdout: {}", e);
        }
    }
}

fn now() -> i64 {
    Utc::now().timestamp_millis()
}
