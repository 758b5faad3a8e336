//! Wire form of the resolve operation.
//!
//! Request fields are all optional at the serde level so that every missing
//! field can be reported at once instead of failing on the first.

use serde::{Deserialize, Serialize};

use deeplaunch_core::{ContentRecord, ContentType, DeviceProfile, LaunchMethod, LaunchPlan};
use deeplaunch_launcher::RaceConfig;

/// Body of `POST /api/deep-link`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub content_id: Option<ContentId>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub device_info: Option<DeviceProfile>,
}

/// Catalog ids arrive as strings or bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContentId {
    Text(String),
    Number(u64),
}

impl ContentId {
    fn into_string(self) -> String {
        match self {
            ContentId::Text(s) => s,
            ContentId::Number(n) => n.to_string(),
        }
    }
}

/// Why a [`LaunchRequest`] could not be turned into a [`ResolveRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Unsupported contentType '{0}' (expected \"movie\" or \"tv\")")]
    InvalidContentType(String),
}

/// A request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub platform: String,
    pub content: ContentRecord,
    /// Client-reported profile, already normalised
    pub device_info: Option<DeviceProfile>,
}

impl LaunchRequest {
    /// Check required fields, in wire order. Blank strings count as missing.
    pub fn validate(self) -> Result<ResolveRequest, RequestError> {
        let platform = non_blank(self.platform);
        let content_id = non_blank(self.content_id.map(ContentId::into_string));
        let content_type = non_blank(self.content_type);
        let title = non_blank(self.title);

        let missing: Vec<&'static str> = [
            ("platform", platform.is_none()),
            ("contentId", content_id.is_none()),
            ("contentType", content_type.is_none()),
            ("title", title.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(platform), Some(content_id), Some(content_type), Some(title)) =
            (platform, content_id, content_type, title)
        else {
            return Err(RequestError::MissingFields(missing));
        };

        let content_type: ContentType = content_type
            .parse()
            .map_err(|_| RequestError::InvalidContentType(content_type.clone()))?;

        Ok(ResolveRequest {
            platform,
            content: ContentRecord::new(content_id, content_type, title),
            device_info: self.device_info.map(DeviceProfile::normalized),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResponse {
    pub primary_url: String,
    pub fallback_url: String,
    pub launch_method: LaunchMethod,
    pub user_message: String,
    /// Display name of the resolved platform
    pub platform: String,
    pub requires_timeout: bool,
    pub expected_behavior: String,
    pub device_optimized: bool,
}

impl LaunchResponse {
    pub fn from_plan(plan: &LaunchPlan, race: &RaceConfig, device_optimized: bool) -> Self {
        Self {
            primary_url: plan.primary_url.clone(),
            fallback_url: plan.fallback_url.clone(),
            launch_method: plan.method,
            user_message: plan.user_message.clone(),
            platform: plan.platform_display_name.clone(),
            requires_timeout: plan.requires_race,
            expected_behavior: expected_behavior(plan, race),
            device_optimized,
        }
    }
}

fn expected_behavior(plan: &LaunchPlan, race: &RaceConfig) -> String {
    let name = &plan.platform_display_name;
    match plan.method {
        LaunchMethod::Hybrid => format!(
            "Tries the {} app first and opens the website if the app has not opened within {} ms.",
            name,
            race.fallback_timeout.as_millis()
        ),
        LaunchMethod::Native => format!("Opens the {} app.", name),
        LaunchMethod::Web => format!("Opens {} in the browser.", name),
    }
}
