//! Device classification from environment signals.
//!
//! Three independent passes run over the same signals, each an ordered rule
//! table evaluated first-match-wins:
//!
//! | Pass | Order |
//! |------|-------|
//! | Device class | smart TV → phone → tablet → iPadOS desktop mode → narrow touch viewport → desktop |
//! | OS | iOS → Android → Windows → macOS → Linux (user agent first, then platform hint) |
//! | Browser | Edge → Opera → Samsung → Firefox → Chrome → Mobile Safari → Safari |
//!
//! Ordering matters because the patterns overlap: smart-TV strings carry
//! `Mobile`/`Android` tokens, every iOS user agent says `like Mac OS X`, every
//! Android user agent says `Linux`, and Chrome and Edge both claim `Safari`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, OnceLock};

use crate::types::{Browser, DeviceClass, DeviceProfile, Os};

/// Viewports narrower than this (CSS pixels) count as phone-sized.
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;

// ─────────────────────────────────────────────────────────────────────────────
// Signals
// ─────────────────────────────────────────────────────────────────────────────

/// Static environment signals reported by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSignals {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub platform_hint: Option<String>,
    #[serde(default)]
    pub viewport_width: Option<u32>,
    #[serde(default)]
    pub touch_capable: bool,
}

impl EnvironmentSignals {
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            ..Self::default()
        }
    }

    pub fn classify(&self) -> DeviceProfile {
        classify(
            self.user_agent.as_deref(),
            self.platform_hint.as_deref(),
            self.viewport_width,
            self.touch_capable,
        )
    }
}

/// Borrowed view of the signals handed to rule predicates.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub user_agent: &'a str,
    pub platform_hint: &'a str,
    pub viewport_width: Option<u32>,
    pub touch_capable: bool,
}

impl Signals<'_> {
    fn is_narrow_viewport(&self) -> bool {
        self.viewport_width
            .is_some_and(|width| width < NARROW_VIEWPORT_WIDTH)
    }

    /// iPadOS 13+ Safari reports a Macintosh user agent by default.
    fn is_ipad_desktop_mode(&self) -> bool {
        self.touch_capable
            && (MACINTOSH.is_match(self.user_agent) || MACINTOSH.is_match(self.platform_hint))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// One `(predicate, classification)` entry of an ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T: 'static> {
    pub name: &'static str,
    predicate: fn(&Signals<'_>) -> bool,
    pub value: T,
}

impl<T: Copy> Rule<T> {
    pub fn matches(&self, signals: &Signals<'_>) -> bool {
        (self.predicate)(signals)
    }
}

/// Evaluate an ordered rule table, returning the first match.
pub fn first_match<T: Copy>(rules: &[Rule<T>], signals: &Signals<'_>) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.matches(signals))
        .map(|rule| rule.value)
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("valid pattern: ", stringify!($name))));
    };
}

pattern!(
    SMART_TV,
    r"(?i)smart-?tv|hbbtv|netcast|web0s|vidaa|roku|crkey|bravia|appletv|apple ?tv|google ?tv|android ?tv|philipstv|\bviera\b|\bdtv\b|(?-i:\bAFT[A-Z0-9]{1,4}\b)"
);
pattern!(
    PHONE,
    r"(?i)\biphone\b|\bipod\b|android.*\bmobile\b|windows phone|iemobile|blackberry|\bbb10\b|opera mini"
);
pattern!(
    TABLET,
    r"(?i)\bipad\b|android|\btablet\b|kindle|\bsilk\b|playbook"
);
pattern!(MACINTOSH, r"(?i)macintosh|macintel");

pattern!(OS_IOS, r"(?i)\biphone\b|\bipad\b|\bipod\b|\bcpu os\b|crios|fxios|edgios|opios");
pattern!(OS_ANDROID, r"(?i)android");
pattern!(OS_WINDOWS, r"(?i)windows|\bwin(32|64)\b");
pattern!(OS_MACOS, r"(?i)macintosh|mac os x|macintel|macppc");
pattern!(OS_LINUX, r"(?i)linux|x11|\bcros\b|ubuntu|fedora");

pattern!(BROWSER_EDGE, r"\bEdg(e|A|iOS)?/");
pattern!(BROWSER_OPERA, r"\bOPR/|\bOPiOS/|\bOpera\b");
pattern!(BROWSER_SAMSUNG, r"\bSamsungBrowser/");
pattern!(BROWSER_FIREFOX, r"\bFirefox/|\bFxiOS/");
pattern!(BROWSER_CHROME, r"\bChrome/|\bCriOS/|\bChromium/");
pattern!(BROWSER_IOS_SAFARI, r"\b(iPhone|iPad|iPod)\b.*\bMobile/");
pattern!(BROWSER_SAFARI, r"(?i)applewebkit.*like gecko.*safari");

/// Device class rules, evaluated in order; the fallback is [`DeviceClass::Desktop`].
pub static DEVICE_CLASS_RULES: &[Rule<DeviceClass>] = &[
    Rule {
        name: "smart-tv-signature",
        predicate: |s| SMART_TV.is_match(s.user_agent),
        value: DeviceClass::SmartTv,
    },
    Rule {
        name: "phone-signature",
        predicate: |s| PHONE.is_match(s.user_agent),
        value: DeviceClass::Mobile,
    },
    Rule {
        name: "tablet-signature",
        predicate: |s| TABLET.is_match(s.user_agent),
        value: DeviceClass::Tablet,
    },
    Rule {
        name: "ipados-desktop-mode",
        predicate: |s| s.is_ipad_desktop_mode(),
        value: DeviceClass::Tablet,
    },
    Rule {
        name: "narrow-touch-viewport",
        predicate: |s| s.is_narrow_viewport() && s.touch_capable,
        value: DeviceClass::Mobile,
    },
];

/// OS rules. Each is tried against the user agent and then the platform hint.
pub static OS_RULES: &[Rule<Os>] = &[
    Rule {
        name: "ios",
        predicate: |s| {
            OS_IOS.is_match(s.user_agent)
                || OS_IOS.is_match(s.platform_hint)
                || s.is_ipad_desktop_mode()
        },
        value: Os::Ios,
    },
    Rule {
        name: "android",
        predicate: |s| OS_ANDROID.is_match(s.user_agent) || OS_ANDROID.is_match(s.platform_hint),
        value: Os::Android,
    },
    Rule {
        name: "windows",
        predicate: |s| OS_WINDOWS.is_match(s.user_agent) || OS_WINDOWS.is_match(s.platform_hint),
        value: Os::Windows,
    },
    Rule {
        name: "macos",
        predicate: |s| OS_MACOS.is_match(s.user_agent) || OS_MACOS.is_match(s.platform_hint),
        value: Os::MacOs,
    },
    Rule {
        name: "linux",
        predicate: |s| OS_LINUX.is_match(s.user_agent) || OS_LINUX.is_match(s.platform_hint),
        value: Os::Linux,
    },
];

/// Browser rules; the fallback is [`Browser::Unknown`].
pub static BROWSER_RULES: &[Rule<Browser>] = &[
    Rule {
        name: "edge",
        predicate: |s| BROWSER_EDGE.is_match(s.user_agent),
        value: Browser::Edge,
    },
    Rule {
        name: "opera",
        predicate: |s| BROWSER_OPERA.is_match(s.user_agent),
        value: Browser::Opera,
    },
    Rule {
        name: "samsung-internet",
        predicate: |s| BROWSER_SAMSUNG.is_match(s.user_agent),
        value: Browser::SamsungInternet,
    },
    Rule {
        name: "firefox",
        predicate: |s| BROWSER_FIREFOX.is_match(s.user_agent),
        value: Browser::Firefox,
    },
    Rule {
        name: "chrome",
        predicate: |s| BROWSER_CHROME.is_match(s.user_agent),
        value: Browser::Chrome,
    },
    Rule {
        name: "mobile-safari",
        predicate: |s| {
            BROWSER_IOS_SAFARI.is_match(s.user_agent)
                || (s.is_ipad_desktop_mode() && BROWSER_SAFARI.is_match(s.user_agent))
        },
        value: Browser::MobileSafari,
    },
    Rule {
        name: "safari",
        predicate: |s| BROWSER_SAFARI.is_match(s.user_agent),
        value: Browser::Safari,
    },
];

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Classify the calling device.
///
/// Pure and deterministic. With no user agent, no platform hint and no
/// viewport (a non-interactive context) the safe default profile is returned.
pub fn classify(
    user_agent: Option<&str>,
    platform_hint: Option<&str>,
    viewport_width: Option<u32>,
    touch_capable: bool,
) -> DeviceProfile {
    let user_agent = user_agent.map(str::trim).unwrap_or_default();
    let platform_hint = platform_hint.map(str::trim).unwrap_or_default();

    if user_agent.is_empty() && platform_hint.is_empty() && viewport_width.is_none() {
        return DeviceProfile::safe_default();
    }

    let signals = Signals {
        user_agent,
        platform_hint,
        viewport_width,
        touch_capable,
    };

    let device_class = first_match(DEVICE_CLASS_RULES, &signals).unwrap_or(DeviceClass::Desktop);
    let os = first_match(OS_RULES, &signals).unwrap_or(Os::Unknown);
    let browser = first_match(BROWSER_RULES, &signals).unwrap_or(Browser::Unknown);

    DeviceProfile::new(device_class, os, browser)
}

/// Per-session memo of the device profile.
///
/// The first call to [`DeviceSession::profile`] classifies; every later call
/// returns that same profile regardless of the signals passed.
#[derive(Debug, Default)]
pub struct DeviceSession {
    profile: OnceLock<DeviceProfile>,
}

impl DeviceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, signals: &EnvironmentSignals) -> DeviceProfile {
        *self.profile.get_or_init(|| signals.classify())
    }

    pub fn cached(&self) -> Option<DeviceProfile> {
        self.profile.get().copied()
    }
}
