//! Platform registry: where each streaming platform lives on the web and which
//! native URL forms its apps register.
//!
//! The built-in table is compiled in; a config file may add or override entries
//! once at start-up, after which the registry is never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::prelude::*;
use crate::types::Os;

/// Placeholder substituted with the content id in intent templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Web search used for platforms we have no entry for.
pub const SEARCH_BASE_URL: &str = "https://www.google.com/search?q=";

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Everything needed to build links into one platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformDescriptor {
    pub id: String,
    pub display_name: String,
    /// Content id is appended directly to this
    pub web_base_url: String,
    #[serde(default)]
    pub ios_scheme: Option<String>,
    #[serde(default)]
    pub android_scheme: Option<String>,
    /// Android `intent://` URI containing an `{id}` placeholder
    #[serde(default)]
    pub android_intent_template: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(skip)]
    search_fallback: bool,
}

impl PlatformDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        web_base_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            web_base_url: web_base_url.into(),
            ios_scheme: None,
            android_scheme: None,
            android_intent_template: None,
            aliases: Vec::new(),
            search_fallback: false,
        }
    }

    pub fn with_ios_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.ios_scheme = Some(scheme.into());
        self
    }

    pub fn with_android_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.android_scheme = Some(scheme.into());
        self
    }

    pub fn with_android_intent(mut self, template: impl Into<String>) -> Self {
        self.android_intent_template = Some(template.into());
        self
    }

    /// Synthetic descriptor for an id the registry does not know.
    pub fn search_fallback(platform_id: &str) -> Self {
        let id = platform_id.trim();
        Self {
            search_fallback: true,
            ..Self::new(id, id, SEARCH_BASE_URL)
        }
    }

    pub fn is_search_fallback(&self) -> bool {
        self.search_fallback
    }

    /// Native scheme prefix for the given OS, if the platform registers one.
    pub fn native_scheme(&self, os: Os) -> Option<&str> {
        match os {
            Os::Ios => self.ios_scheme.as_deref(),
            Os::Android => self.android_scheme.as_deref(),
            _ => None,
        }
        .filter(|s| !s.is_empty())
    }

    /// Intent template, only if it actually carries the id placeholder.
    pub fn intent_template(&self) -> Option<&str> {
        self.android_intent_template
            .as_deref()
            .filter(|t| t.contains(ID_PLACEHOLDER))
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::config_invalid("platform id must not be empty"));
        }
        if self.web_base_url.trim().is_empty() {
            return Err(Error::config_invalid(format!(
                "platform '{}' has an empty web_base_url",
                self.id
            )));
        }
        if let Some(template) = &self.android_intent_template {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(Error::config_invalid(format!(
                    "platform '{}' intent template is missing the {} placeholder",
                    self.id, ID_PLACEHOLDER
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in table
// ─────────────────────────────────────────────────────────────────────────────

/// Compile-time platform entry.
#[derive(Debug, Clone, Copy)]
pub struct PlatformEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    pub web_base_url: &'static str,
    pub ios_scheme: Option<&'static str>,
    pub android_scheme: Option<&'static str>,
    pub android_intent_template: Option<&'static str>,
    pub aliases: &'static [&'static str],
}

impl From<&PlatformEntry> for PlatformDescriptor {
    fn from(entry: &PlatformEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            display_name: entry.display_name.to_string(),
            web_base_url: entry.web_base_url.to_string(),
            ios_scheme: entry.ios_scheme.map(str::to_string),
            android_scheme: entry.android_scheme.map(str::to_string),
            android_intent_template: entry.android_intent_template.map(str::to_string),
            aliases: entry.aliases.iter().map(|a| a.to_string()).collect(),
            search_fallback: false,
        }
    }
}

/// Supported platforms.
pub const KNOWN_PLATFORMS: &[PlatformEntry] = &[
    PlatformEntry {
        id: "netflix",
        display_name: "Netflix",
        web_base_url: "https://www.netflix.com/title/",
        ios_scheme: Some("nflx://www.netflix.com/title/"),
        android_scheme: Some("nflx://www.netflix.com/title/"),
        android_intent_template: Some(
            "intent://www.netflix.com/title/{id}#Intent;scheme=nflx;package=com.netflix.mediaclient;S.browser_fallback_url=https%3A%2F%2Fwww.netflix.com%2Ftitle%2F{id};end",
        ),
        aliases: &[],
    },
    PlatformEntry {
        id: "prime",
        display_name: "Prime Video",
        web_base_url: "https://www.primevideo.com/detail/",
        ios_scheme: Some("aiv://aiv/detail?asin="),
        android_scheme: Some("primevideo://detail?asin="),
        android_intent_template: Some(
            "intent://detail?asin={id}#Intent;scheme=primevideo;package=com.amazon.avod.thirdpartyclient;S.browser_fallback_url=https%3A%2F%2Fwww.primevideo.com%2Fdetail%2F{id};end",
        ),
        aliases: &["amazon", "primevideo", "amazon-prime"],
    },
    PlatformEntry {
        id: "disney",
        display_name: "Disney+",
        web_base_url: "https://www.disneyplus.com/video/",
        ios_scheme: Some("disneyplus://video/"),
        android_scheme: Some("disneyplus://video/"),
        android_intent_template: Some(
            "intent://video/{id}#Intent;scheme=disneyplus;package=com.disney.disneyplus;S.browser_fallback_url=https%3A%2F%2Fwww.disneyplus.com%2Fvideo%2F{id};end",
        ),
        aliases: &["disneyplus", "disney+"],
    },
    PlatformEntry {
        id: "hulu",
        display_name: "Hulu",
        web_base_url: "https://www.hulu.com/watch/",
        ios_scheme: Some("hulu://watch/"),
        android_scheme: Some("hulu://watch/"),
        android_intent_template: Some(
            "intent://watch/{id}#Intent;scheme=hulu;package=com.hulu.plus;S.browser_fallback_url=https%3A%2F%2Fwww.hulu.com%2Fwatch%2F{id};end",
        ),
        aliases: &[],
    },
    PlatformEntry {
        id: "max",
        display_name: "Max",
        web_base_url: "https://play.max.com/video/watch/",
        ios_scheme: Some("max://video/watch/"),
        android_scheme: Some("max://video/watch/"),
        android_intent_template: Some(
            "intent://video/watch/{id}#Intent;scheme=max;package=com.wbd.stream;S.browser_fallback_url=https%3A%2F%2Fplay.max.com%2Fvideo%2Fwatch%2F{id};end",
        ),
        aliases: &["hbo", "hbomax", "hbo-max"],
    },
    PlatformEntry {
        id: "apple",
        display_name: "Apple TV+",
        web_base_url: "https://tv.apple.com/title/",
        ios_scheme: Some("videos://tv.apple.com/title/"),
        android_scheme: None,
        android_intent_template: None,
        aliases: &["appletv", "apple-tv", "appletv+"],
    },
    PlatformEntry {
        id: "youtube",
        display_name: "YouTube",
        web_base_url: "https://www.youtube.com/watch?v=",
        ios_scheme: Some("youtube://www.youtube.com/watch?v="),
        android_scheme: Some("vnd.youtube://"),
        android_intent_template: Some(
            "intent://www.youtube.com/watch?v={id}#Intent;scheme=https;package=com.google.android.youtube;S.browser_fallback_url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3D{id};end",
        ),
        aliases: &["yt"],
    },
    PlatformEntry {
        id: "paramount",
        display_name: "Paramount+",
        web_base_url: "https://www.paramountplus.com/movies/video/",
        ios_scheme: Some("paramountplus://content/"),
        android_scheme: Some("paramountplus://content/"),
        android_intent_template: Some(
            "intent://content/{id}#Intent;scheme=paramountplus;package=com.cbs.ott;S.browser_fallback_url=https%3A%2F%2Fwww.paramountplus.com%2Fmovies%2Fvideo%2F{id};end",
        ),
        aliases: &["paramountplus", "paramount+"],
    },
    PlatformEntry {
        id: "peacock",
        display_name: "Peacock",
        web_base_url: "https://www.peacocktv.com/watch/asset/",
        ios_scheme: Some("peacock://asset/"),
        android_scheme: Some("peacock://asset/"),
        android_intent_template: None,
        aliases: &["peacocktv"],
    },
    PlatformEntry {
        id: "crunchyroll",
        display_name: "Crunchyroll",
        web_base_url: "https://www.crunchyroll.com/watch/",
        ios_scheme: Some("crunchyroll://watch/"),
        android_scheme: Some("crunchyroll://watch/"),
        android_intent_template: Some(
            "intent://watch/{id}#Intent;scheme=crunchyroll;package=com.crunchyroll.crunchyroid;S.browser_fallback_url=https%3A%2F%2Fwww.crunchyroll.com%2Fwatch%2F{id};end",
        ),
        aliases: &[],
    },
];

static BUILTIN: LazyLock<PlatformRegistry> = LazyLock::new(PlatformRegistry::builtin);

/// Look a platform up in the built-in table.
///
/// Unknown ids yield [`PlatformDescriptor::search_fallback`]; this never fails.
pub fn lookup(platform_id: &str) -> PlatformDescriptor {
    BUILTIN.lookup(platform_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable id → descriptor table.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<PlatformDescriptor>,
    /// Lower-cased id or alias → index into `platforms`
    index: HashMap<String, usize>,
}

impl PlatformRegistry {
    /// Registry holding only [`KNOWN_PLATFORMS`].
    pub fn builtin() -> Self {
        Self::from_descriptors(KNOWN_PLATFORMS.iter().map(PlatformDescriptor::from))
    }

    /// Built-in table with config-declared platforms merged in.
    ///
    /// An override whose id matches a built-in entry replaces it.
    pub fn with_overrides(overrides: Vec<PlatformDescriptor>) -> Result<Self> {
        for descriptor in &overrides {
            descriptor.validate()?;
        }

        let mut platforms: Vec<PlatformDescriptor> =
            KNOWN_PLATFORMS.iter().map(PlatformDescriptor::from).collect();

        for descriptor in overrides {
            let key = normalize_id(&descriptor.id);
            match platforms.iter_mut().find(|p| normalize_id(&p.id) == key) {
                Some(existing) => {
                    debug!("Overriding built-in platform '{}'", key);
                    *existing = descriptor;
                }
                None => {
                    debug!("Registering platform '{}' from config", key);
                    platforms.push(descriptor);
                }
            }
        }

        Ok(Self::from_descriptors(platforms))
    }

    fn from_descriptors(descriptors: impl IntoIterator<Item = PlatformDescriptor>) -> Self {
        let platforms: Vec<PlatformDescriptor> = descriptors.into_iter().collect();
        let mut index = HashMap::new();

        // Aliases first so a real id always wins over an alias of the same name
        for (i, p) in platforms.iter().enumerate() {
            for alias in &p.aliases {
                index.insert(normalize_id(alias), i);
            }
        }
        for (i, p) in platforms.iter().enumerate() {
            index.insert(normalize_id(&p.id), i);
        }

        Self { platforms, index }
    }

    /// Find a platform by id or alias, case-insensitively.
    pub fn get(&self, platform_id: &str) -> Option<&PlatformDescriptor> {
        self.index
            .get(&normalize_id(platform_id))
            .map(|&i| &self.platforms[i])
    }

    /// Like [`get`](Self::get), but unknown ids degrade to a search descriptor.
    pub fn lookup(&self, platform_id: &str) -> PlatformDescriptor {
        match self.get(platform_id) {
            Some(descriptor) => descriptor.clone(),
            None => {
                debug!("Unknown platform '{}', using search fallback", platform_id);
                PlatformDescriptor::search_fallback(platform_id)
            }
        }
    }

    pub fn contains(&self, platform_id: &str) -> bool {
        self.get(platform_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformDescriptor> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}
