//! Settings loader for `config.toml`

use std::path::{Path, PathBuf};

use deeplaunch_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "deeplaunch";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "DEEPLAUNCH_CONFIG";

/// `<config_dir>/deeplaunch/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Pick the config file to use.
///
/// Priority:
/// 1. An explicit `--config` path
/// 2. `$DEEPLAUNCH_CONFIG`
/// 3. [`default_config_path`]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Load settings from `config_path`.
///
/// A missing or unparsable file yields defaults; the reason is logged.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write a commented default config to `config_path` unless one exists.
///
/// Returns `true` when a file was written.
pub fn init_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::config(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| Error::config(format!("Failed to write {}: {}", config_path.display(), e)))?;

    info!("Wrote default config to {:?}", config_path);
    Ok(true)
}

const DEFAULT_CONFIG: &str = r#"# deeplaunch configuration

[launch]
# How long the native app has to take the foreground before the
# web fallback opens
fallback_timeout_ms = 2500
# Hides sooner than this after the native attempt are ignored
plausibility_floor_ms = 150
# Android intent URLs carry their own browser fallback.
#   "layered"     - the timer still opens the fallback URL
#   "intent_only" - the timer leaves the fallback to the browser
intent_fallback = "layered"

[server]
bind = "127.0.0.1:8787"

# Extra platforms, or overrides for built-in ones (same id).
# Content ids are appended to web_base_url and to the schemes;
# android_intent_template uses an {id} placeholder.
#
# [[platforms]]
# id = "tubi"
# display_name = "Tubi"
# web_base_url = "https://tubitv.com/movies/"
# ios_scheme = "tubitv://media-details?contentId="
# android_scheme = "tubitv://media-details?contentId="
# aliases = ["tubitv"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_missing_file() {
        let temp = tempdir().unwrap();
        let settings = load_settings(&temp.path().join("config.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        let config = r#"
[launch]
fallback_timeout_ms = 3000

[server]
bind = "0.0.0.0:9000"
"#;
        std::fs::write(&path, config).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.launch.fallback_timeout_ms, 3000);
        assert_eq!(settings.launch.plausibility_floor_ms, 150);
        assert_eq!(settings.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "not valid toml {{{{").unwrap();

        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_init_config_writes_valid_default() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        assert!(init_config(&path).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Settings = toml::from_str(&content).expect("Default config should be valid TOML");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_init_config_idempotent() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[launch]\nfallback_timeout_ms = 4000\n").unwrap();

        assert!(!init_config(&path).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("fallback_timeout_ms = 4000"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_priority() {
        let explicit = PathBuf::from("/tmp/explicit.toml");

        std::env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");
        assert_eq!(resolve_config_path(Some(&explicit)), Some(explicit.clone()));
        assert_eq!(
            resolve_config_path(None),
            Some(PathBuf::from("/tmp/from-env.toml"))
        );

        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(resolve_config_path(None), default_config_path());
    }

    #[test]
    #[serial]
    fn test_blank_env_var_is_ignored() {
        std::env::set_var(CONFIG_ENV_VAR, "  ");
        assert_eq!(resolve_config_path(None), default_config_path());
        std::env::remove_var(CONFIG_ENV_VAR);
    }
}
