//! Configuration file parsing for deeplaunch
//!
//! Supports `<config_dir>/deeplaunch/config.toml`, or the file named by
//! `--config` / `$DEEPLAUNCH_CONFIG`.

pub mod settings;
pub mod types;

pub use settings::{
    default_config_path, init_config, load_settings, resolve_config_path, CONFIG_ENV_VAR,
};
pub use types::*;
