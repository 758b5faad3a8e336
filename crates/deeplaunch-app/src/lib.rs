//! # deeplaunch-app - Launch Surface
//!
//! Wires the pure core and the launcher into something callable: TOML
//! configuration, the request/response wire types, the [`LaunchService`]
//! orchestration trait and the axum HTTP endpoint.
//!
//! Depends on [`deeplaunch_core`] and [`deeplaunch_launcher`].
//!
//! ## Public API
//!
//! ### Configuration (`config`)
//! - [`Settings`] - `[launch]`, `[server]` and `[[platforms]]` sections
//! - [`load_settings()`] - Load `config.toml`, falling back to defaults
//! - [`init_config()`] - Write a commented default file
//!
//! ### Service (`service`)
//! - [`LaunchService`] - Resolve a request into a plan, execute a plan
//! - [`DeepLinkService`] - Registry + executor implementation
//!
//! ### Wire (`wire`)
//! - [`LaunchRequest`] / [`ResolveRequest`] - Raw and validated request bodies
//! - [`LaunchResponse`] - Success body
//!
//! ### HTTP (`server`)
//! - [`router()`] - `POST /api/deep-link`, `GET /health`
//! - [`serve()`] - Bind and serve until Ctrl+C

pub mod config;
pub mod server;
pub mod service;
pub mod wire;

pub use config::{
    default_config_path, init_config, load_settings, resolve_config_path, LaunchSettings,
    ServerSettings, Settings,
};
pub use server::{router, serve, ApiError, DEEP_LINK_PATH, HEALTH_PATH};
pub use service::{DeepLinkService, LaunchService, LocalLaunchService};
pub use wire::{LaunchRequest, LaunchResponse, RequestError, ResolveRequest};
