//! Configuration types for deeplaunch
//!
//! Defines:
//! - `Settings` - Contents of `config.toml`
//! - `LaunchSettings` - Race tunables
//! - `ServerSettings` - HTTP endpoint options

use std::time::Duration;

use serde::{Deserialize, Serialize};

use deeplaunch_core::prelude::*;
use deeplaunch_core::PlatformDescriptor;
use deeplaunch_launcher::{
    IntentFallbackPolicy, RaceConfig, DEFAULT_FALLBACK_TIMEOUT, DEFAULT_PLAUSIBILITY_FLOOR,
};

/// Global settings from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub launch: LaunchSettings,

    #[serde(default)]
    pub server: ServerSettings,

    /// Extra platforms, or replacements for built-in ones with the same id
    #[serde(default)]
    pub platforms: Vec<PlatformDescriptor>,
}

impl Settings {
    /// Reject values the launcher cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.launch.validate()?;
        if self.server.bind.trim().is_empty() {
            return Err(Error::config_invalid("server.bind must not be empty"));
        }
        Ok(())
    }
}

/// `[launch]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LaunchSettings {
    /// How long the native app has to take the foreground
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,

    /// Hides sooner than this after the attempt are ignored
    #[serde(default = "default_plausibility_floor_ms")]
    pub plausibility_floor_ms: u64,

    #[serde(default)]
    pub intent_fallback: IntentFallbackPolicy,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            fallback_timeout_ms: default_fallback_timeout_ms(),
            plausibility_floor_ms: default_plausibility_floor_ms(),
            intent_fallback: IntentFallbackPolicy::default(),
        }
    }
}

impl LaunchSettings {
    pub fn race_config(&self) -> RaceConfig {
        RaceConfig {
            fallback_timeout: Duration::from_millis(self.fallback_timeout_ms),
            plausibility_floor: Duration::from_millis(self.plausibility_floor_ms),
            intent_policy: self.intent_fallback,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.fallback_timeout_ms == 0 {
            return Err(Error::config_invalid(
                "launch.fallback_timeout_ms must be greater than zero",
            ));
        }
        // A floor at or past the timeout would make native detection impossible
        if self.plausibility_floor_ms >= self.fallback_timeout_ms {
            return Err(Error::config_invalid(format!(
                "launch.plausibility_floor_ms ({}) must be below launch.fallback_timeout_ms ({})",
                self.plausibility_floor_ms, self.fallback_timeout_ms
            )));
        }
        Ok(())
    }
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Socket address for `deeplaunch serve`
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_fallback_timeout_ms() -> u64 {
    DEFAULT_FALLBACK_TIMEOUT.as_millis() as u64
}

fn default_plausibility_floor_ms() -> u64 {
    DEFAULT_PLAUSIBILITY_FLOOR.as_millis() as u64
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
