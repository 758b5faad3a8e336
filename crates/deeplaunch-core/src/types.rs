//! Core domain types for deeplaunch
//!
//! Defines:
//! - `DeviceProfile` and its component enums - what the requesting device can do
//! - `ContentRecord` / `ContentType` - what the catalog hands us
//! - `LaunchPlan` / `LaunchMethod` - how a hand-off should be attempted
//! - `LaunchOutcome` / `LaunchDisposition` - what actually happened

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Device
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse device form factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    #[default]
    Desktop,
    SmartTv,
}

impl DeviceClass {
    /// Phones and tablets are the only form factors that host app-store apps
    pub fn is_handheld(&self) -> bool {
        matches!(self, DeviceClass::Mobile | DeviceClass::Tablet)
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Mobile => write!(f, "mobile"),
            DeviceClass::Tablet => write!(f, "tablet"),
            DeviceClass::Desktop => write!(f, "desktop"),
            DeviceClass::SmartTv => write!(f, "smartTv"),
        }
    }
}

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Ios,
    Android,
    Windows,
    #[serde(alias = "macOS", alias = "mac")]
    MacOs,
    Linux,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Os {
    /// Operating systems with an app store that can register URL handlers
    pub fn is_app_store_os(&self) -> bool {
        matches!(self, Os::Ios | Os::Android)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Ios => write!(f, "ios"),
            Os::Android => write!(f, "android"),
            Os::Windows => write!(f, "windows"),
            Os::MacOs => write!(f, "macos"),
            Os::Linux => write!(f, "linux"),
            Os::Unknown => write!(f, "unknown"),
        }
    }
}

/// Browser family hosting the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Browser {
    MobileSafari,
    Safari,
    Chrome,
    Firefox,
    Edge,
    Opera,
    SamsungInternet,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::MobileSafari => "Mobile Safari",
            Browser::Safari => "Safari",
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Edge => "Edge",
            Browser::Opera => "Opera",
            Browser::SamsungInternet => "Samsung Internet",
            Browser::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Capability record for the requesting device.
///
/// The two capability flags are always derived from `device_class` and `os`;
/// construct through [`DeviceProfile::new`] (or call [`DeviceProfile::normalized`]
/// on deserialized input) so `native_app_capable` can only be true for an
/// iOS/Android phone or tablet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub device_class: DeviceClass,
    #[serde(default)]
    pub os: Os,
    #[serde(default)]
    pub browser: Browser,
    #[serde(default)]
    pub native_app_capable: bool,
    #[serde(default)]
    pub supports_deep_links: bool,
}

impl DeviceProfile {
    pub fn new(device_class: DeviceClass, os: Os, browser: Browser) -> Self {
        let native_app_capable = device_class.is_handheld() && os.is_app_store_os();
        Self {
            device_class,
            os,
            browser,
            native_app_capable,
            supports_deep_links: native_app_capable || device_class == DeviceClass::Desktop,
        }
    }

    /// Re-derive the capability flags, discarding whatever a client claimed.
    pub fn normalized(self) -> Self {
        Self::new(self.device_class, self.os, self.browser)
    }

    /// Profile used when no environment signals are available.
    pub fn safe_default() -> Self {
        Self {
            device_class: DeviceClass::Desktop,
            os: Os::Unknown,
            browser: Browser::Unknown,
            native_app_capable: false,
            supports_deep_links: false,
        }
    }

    pub fn is_safe_default(&self) -> bool {
        *self == Self::safe_default()
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::safe_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of title being launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    #[serde(alias = "series", alias = "show")]
    Tv,
}

impl ContentType {
    pub fn is_series(&self) -> bool {
        matches!(self, ContentType::Tv)
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "film" => Ok(ContentType::Movie),
            "tv" | "series" | "show" => Ok(ContentType::Tv),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Movie => write!(f, "movie"),
            ContentType::Tv => write!(f, "tv"),
        }
    }
}

/// A catalog entry as supplied by the content collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ContentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
}

impl ContentRecord {
    pub fn new(id: impl Into<String>, content_type: ContentType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type,
            title: title.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Launch plan
// ─────────────────────────────────────────────────────────────────────────────

/// How a plan hands the user off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMethod {
    /// Open a native URL with no web fallback
    Native,
    /// Open the web URL directly
    Web,
    /// Attempt the native URL, race it against a timed web fallback
    Hybrid,
}

impl fmt::Display for LaunchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMethod::Native => write!(f, "native"),
            LaunchMethod::Web => write!(f, "web"),
            LaunchMethod::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Device-specific description of how to attempt a hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchPlan {
    pub primary_url: String,
    pub fallback_url: String,
    pub method: LaunchMethod,
    pub requires_race: bool,
    pub user_message: String,
    pub platform_display_name: String,
}

impl LaunchPlan {
    /// A plan that opens a single web URL.
    pub fn web(
        url: impl Into<String>,
        user_message: impl Into<String>,
        platform_display_name: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            fallback_url: url.clone(),
            primary_url: url,
            method: LaunchMethod::Web,
            requires_race: false,
            user_message: user_message.into(),
            platform_display_name: platform_display_name.into(),
        }
    }

    /// A plan that races `native_url` against a timed `web_url` fallback.
    pub fn hybrid(
        native_url: impl Into<String>,
        web_url: impl Into<String>,
        user_message: impl Into<String>,
        platform_display_name: impl Into<String>,
    ) -> Self {
        Self {
            primary_url: native_url.into(),
            fallback_url: web_url.into(),
            method: LaunchMethod::Hybrid,
            requires_race: true,
            user_message: user_message.into(),
            platform_display_name: platform_display_name.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Launch outcome
// ─────────────────────────────────────────────────────────────────────────────

/// How an execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchDisposition {
    /// A web plan opened its URL
    Web,
    /// The page left the foreground during the race; the app probably opened
    Native,
    /// The race timer fired and the web fallback was opened
    Fallback,
    /// The host refused the final navigation; nothing opened
    Suppressed,
    /// The race timer fired on an intent URL and the intent's own browser
    /// fallback was left in charge
    DeferredToIntent,
    /// The native attempt went out with nothing watching the foreground, so
    /// whether the app opened is unknown and no fallback was opened
    HandedOff,
}

impl fmt::Display for LaunchDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchDisposition::Web => write!(f, "web"),
            LaunchDisposition::Native => write!(f, "native"),
            LaunchDisposition::Fallback => write!(f, "fallback"),
            LaunchDisposition::Suppressed => write!(f, "suppressed"),
            LaunchDisposition::DeferredToIntent => write!(f, "deferredToIntent"),
            LaunchDisposition::HandedOff => write!(f, "handedOff"),
        }
    }
}

/// Result of executing a [`LaunchPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOutcome {
    pub native_launched: bool,
    pub disposition: LaunchDisposition,
    #[serde(rename = "elapsedMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl LaunchOutcome {
    pub fn new(disposition: LaunchDisposition, elapsed: Duration) -> Self {
        Self {
            native_launched: disposition == LaunchDisposition::Native,
            disposition,
            elapsed,
        }
    }

    /// User-facing status line for the launch surface
    pub fn status_message(&self, plan: &LaunchPlan) -> String {
        let name = &plan.platform_display_name;
        match self.disposition {
            LaunchDisposition::Native => format!("Opened in the {} app.", name),
            LaunchDisposition::Web => format!("Opened {} in your browser.", name),
            LaunchDisposition::Fallback => format!(
                "The {} app didn't open, so we opened the website instead.",
                name
            ),
            LaunchDisposition::DeferredToIntent => format!(
                "If the {} app isn't installed, your browser will open the website.",
                name
            ),
            LaunchDisposition::Suppressed => format!(
                "Your browser blocked opening {}. Allow pop-ups or open {} manually.",
                name, plan.fallback_url
            ),
            LaunchDisposition::HandedOff => format!(
                "Asked the {} app to open. If nothing happened, visit {}",
                name, plan.fallback_url
            ),
        }
    }
}

fn serialize_millis<S: serde::Serializer>(
    d: &Duration,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
