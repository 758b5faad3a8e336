//! # deeplaunch-core - Core Domain Types
//!
//! Foundation crate for deeplaunch. Provides the domain types, error handling,
//! logging setup, and the three pure stages of a hand-off: device profiling,
//! platform lookup and link resolution.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, url, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`DeviceProfile`] - Capability record (class, OS, browser, derived flags)
//! - [`ContentRecord`], [`ContentType`] - Catalog input
//! - [`LaunchPlan`], [`LaunchMethod`] - How to attempt a hand-off
//! - [`LaunchOutcome`], [`LaunchDisposition`] - What happened
//!
//! ### Device Profiling (`profiler`)
//! - [`classify()`] - Ordered-rule classification of environment signals
//! - [`EnvironmentSignals`] - Owned signal bundle (wire/CLI form)
//! - [`DeviceSession`] - Once-per-session memo of the profile
//!
//! ### Platform Registry (`registry`)
//! - [`PlatformRegistry`] - Immutable id → descriptor table with config overrides
//! - [`PlatformDescriptor`] - Web base URL, native schemes, intent template
//! - [`lookup()`] - Built-in lookup; unknown ids become a search descriptor
//!
//! ### Link Resolution (`resolver`)
//! - [`resolve()`], [`resolve_content()`] - Pure decision tree producing a plan
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Config, endpoint, navigation and logging failures
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use deeplaunch_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod profiler;
pub mod registry;
pub mod resolver;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use profiler::{classify, DeviceSession, EnvironmentSignals, NARROW_VIEWPORT_WIDTH};
pub use registry::{lookup, PlatformDescriptor, PlatformRegistry, KNOWN_PLATFORMS};
pub use resolver::{resolve, resolve_content};
pub use types::{
    Browser, ContentRecord, ContentType, DeviceClass, DeviceProfile, LaunchDisposition,
    LaunchMethod, LaunchOutcome, LaunchPlan, Os,
};
