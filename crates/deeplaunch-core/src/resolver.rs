//! Link resolution: device profile + platform + content → [`LaunchPlan`].
//!
//! Decision tree, evaluated in order:
//! 1. Unknown platform (or no usable content id) → web search for the title
//! 2. Smart TV → web page, tell the user to use the TV's own app
//! 3. Desktop → web page, suggest the companion app
//! 4. Native-capable phone/tablet → race the Android intent or the OS scheme
//!    against the web page
//! 5. Anything else → web page
//!
//! Resolution never fails; every branch yields a plan with non-empty URLs.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

use crate::registry::{PlatformDescriptor, ID_PLACEHOLDER, SEARCH_BASE_URL};
use crate::types::{ContentRecord, ContentType, DeviceClass, DeviceProfile, LaunchPlan, Os};

/// Characters escaped when a content id is spliced into a URL.
const CONTENT_ID: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'/')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Intent extra holding the browser fallback, itself a percent-encoded URL.
const BROWSER_FALLBACK_EXTRA: &str = "S.browser_fallback_url=";

/// Which branch of the decision tree produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Search,
    SmartTv,
    Desktop,
    NativeApp,
    MobileWeb,
}

/// Resolve a catalog record into a launch plan.
pub fn resolve_content(
    device: &DeviceProfile,
    platform: &PlatformDescriptor,
    content: &ContentRecord,
) -> LaunchPlan {
    resolve(
        device,
        platform,
        &content.id,
        content.content_type,
        &content.title,
    )
}

/// Resolve a launch plan. Pure: identical inputs always yield an identical plan.
pub fn resolve(
    device: &DeviceProfile,
    platform: &PlatformDescriptor,
    content_id: &str,
    content_type: ContentType,
    title: &str,
) -> LaunchPlan {
    let content_id = content_id.trim();
    let title = title.trim();
    let name = display_name(platform);

    if platform.is_search_fallback() || content_id.is_empty() {
        let url = search_url(platform, title);
        let message = user_message(Branch::Search, content_type, title, name);
        return LaunchPlan::web(url, message, name);
    }

    let encoded_id = encode_id(content_id);
    let web_url = format!("{}{}", platform.web_base_url, encoded_id);

    match device.device_class {
        DeviceClass::SmartTv => {
            let message = user_message(Branch::SmartTv, content_type, title, name);
            return LaunchPlan::web(web_url, message, name);
        }
        DeviceClass::Desktop => {
            let message = user_message(Branch::Desktop, content_type, title, name);
            return LaunchPlan::web(web_url, message, name);
        }
        DeviceClass::Mobile | DeviceClass::Tablet => {}
    }

    if device.native_app_capable {
        if let Some(native_url) = native_url(device.os, platform, &encoded_id) {
            let message = user_message(Branch::NativeApp, content_type, title, name);
            return LaunchPlan::hybrid(native_url, web_url, message, name);
        }
    }

    let message = user_message(Branch::MobileWeb, content_type, title, name);
    LaunchPlan::web(web_url, message, name)
}

/// Android prefers the intent form (it carries its own browser fallback);
/// otherwise the OS scheme prefix is used.
fn native_url(os: Os, platform: &PlatformDescriptor, encoded_id: &str) -> Option<String> {
    if os == Os::Android {
        if let Some(template) = platform.intent_template() {
            return Some(fill_intent(template, encoded_id));
        }
    }
    platform
        .native_scheme(os)
        .map(|scheme| format!("{}{}", scheme, encoded_id))
}

/// Substitute the id into an intent template. Inside the browser fallback
/// extra the id is encoded once more, so the extra decodes to the same URL
/// as the plan's fallback.
fn fill_intent(template: &str, encoded_id: &str) -> String {
    match template.find(BROWSER_FALLBACK_EXTRA) {
        Some(at) => {
            let (intent, extra) = template.split_at(at);
            format!(
                "{}{}",
                intent.replace(ID_PLACEHOLDER, encoded_id),
                extra.replace(ID_PLACEHOLDER, &encode_id(encoded_id))
            )
        }
        None => template.replace(ID_PLACEHOLDER, encoded_id),
    }
}

fn search_url(platform: &PlatformDescriptor, title: &str) -> String {
    let query = format!("{} {}", title, platform.id.trim());
    let encoded: String = form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{}{}", SEARCH_BASE_URL, encoded)
}

fn encode_id(content_id: &str) -> String {
    utf8_percent_encode(content_id, CONTENT_ID).to_string()
}

fn display_name(platform: &PlatformDescriptor) -> &str {
    let name = platform.display_name.trim();
    if name.is_empty() {
        "this platform"
    } else {
        name
    }
}

fn user_message(branch: Branch, content_type: ContentType, title: &str, platform: &str) -> String {
    let series = content_type.is_series();
    let title = match (title.is_empty(), series) {
        (false, _) => format!("\"{}\"", title),
        (true, true) => "this series".to_string(),
        (true, false) => "this title".to_string(),
    };

    match (branch, series) {
        (Branch::Search, false) => format!(
            "We don't have a direct link for {}. Searching the web for {}.",
            platform, title
        ),
        (Branch::Search, true) => format!(
            "We don't have a direct link for {}. Searching the web for the series {}.",
            platform, title
        ),
        (Branch::SmartTv, false) => format!(
            "Open the {} app on your TV and search for {} to start watching.",
            platform, title
        ),
        (Branch::SmartTv, true) => format!(
            "Open the {} app on your TV and search for {}, then choose a season and episode.",
            platform, title
        ),
        (Branch::Desktop, false) => format!(
            "Opening {} on {}. Get the {} app on your phone or tablet to watch on the go.",
            title, platform, platform
        ),
        (Branch::Desktop, true) => format!(
            "Opening {} on {}. Pick up any episode from the series page, or get the {} app on your phone or tablet.",
            title, platform, platform
        ),
        (Branch::NativeApp, false) => format!(
            "Opening {} in the {} app. If the app isn't installed, we'll take you to the website.",
            title, platform
        ),
        (Branch::NativeApp, true) => format!(
            "Opening {} in the {} app. Choose a season and episode once it loads; if the app isn't installed, we'll take you to the website.",
            title, platform
        ),
        (Branch::MobileWeb, false) => format!("Opening {} on the {} website.", title, platform),
        (Branch::MobileWeb, true) => format!(
            "Opening {} on the {} website, where you can choose an episode.",
            title, platform
        ),
    }
}
