//! HTTP launch endpoint tests, driven through the router with `oneshot`

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use deeplaunch_app::{
    load_settings, router, DeepLinkService, LaunchResponse, LaunchService, ResolveRequest,
    Settings, DEEP_LINK_PATH, HEALTH_PATH,
};
use deeplaunch_core::{DeviceProfile, LaunchMethod, LaunchOutcome, LaunchPlan};
use deeplaunch_launcher::test_utils::RecordingNavigator;
use deeplaunch_launcher::RaceConfig;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";

fn app_with(settings: &Settings) -> Router {
    let service = DeepLinkService::from_settings(settings, RecordingNavigator::new()).unwrap();
    router(Arc::new(service))
}

fn app() -> Router {
    app_with(&Settings::default())
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<String>,
    user_agent: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(ua) = user_agent {
        builder = builder.header(header::USER_AGENT, ua);
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: Router, body: Value, user_agent: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::POST, DEEP_LINK_PATH, Some(body.to_string()), user_agent).await
}

fn netflix_request() -> Value {
    json!({
        "platform": "netflix",
        "contentId": "80057281",
        "contentType": "tv",
        "title": "Stranger Things",
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Success
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ios_phone_device_info_gets_hybrid_plan() {
    let mut body = netflix_request();
    body["deviceInfo"] = json!({ "deviceClass": "mobile", "os": "ios", "browser": "mobileSafari" });

    let (status, json) = post(app(), body, None).await;
    assert_eq!(status, StatusCode::OK);

    let response: LaunchResponse = serde_json::from_value(json).unwrap();
    assert_eq!(response.primary_url, "nflx://www.netflix.com/title/80057281");
    assert_eq!(response.fallback_url, "https://www.netflix.com/title/80057281");
    assert_eq!(response.launch_method, LaunchMethod::Hybrid);
    assert!(response.requires_timeout);
    assert_eq!(response.platform, "Netflix");
    assert!(response.device_optimized);
    assert!(response.expected_behavior.contains("2500"));
}

#[tokio::test]
async fn test_user_agent_header_is_classified() {
    let (status, json) = post(app(), netflix_request(), Some(IPHONE_UA)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["primaryUrl"], "nflx://www.netflix.com/title/80057281");
    assert_eq!(json["launchMethod"], "hybrid");
    assert_eq!(json["deviceOptimized"], true);
}

#[tokio::test]
async fn test_no_device_signals_uses_safe_default() {
    let (status, json) = post(app(), netflix_request(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["launchMethod"], "web");
    assert_eq!(json["requiresTimeout"], false);
    assert_eq!(json["deviceOptimized"], false);
    assert_eq!(json["primaryUrl"], json["fallbackUrl"]);
    assert_eq!(json["primaryUrl"], "https://www.netflix.com/title/80057281");
}

#[tokio::test]
async fn test_unknown_platform_degrades_to_search() {
    let body = json!({
        "platform": "xyz-unknown",
        "contentId": "42",
        "contentType": "movie",
        "title": "Inception",
    });
    let (status, json) = post(app(), body, Some(IPHONE_UA)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["launchMethod"], "web");
    assert_eq!(json["requiresTimeout"], false);
    assert_eq!(json["primaryUrl"], json["fallbackUrl"]);
    let url = json["primaryUrl"].as_str().unwrap();
    assert!(url.contains("Inception"));
    assert!(url.contains("xyz-unknown"));
}

#[tokio::test]
async fn test_smart_tv_never_races() {
    let mut body = netflix_request();
    body["deviceInfo"] = json!({ "deviceClass": "smartTv", "os": "android" });

    let (status, json) = post(app(), body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["launchMethod"], "web");
    assert_eq!(json["requiresTimeout"], false);
}

#[tokio::test]
async fn test_client_cannot_claim_native_capability() {
    let mut body = netflix_request();
    body["deviceInfo"] = json!({
        "deviceClass": "desktop",
        "os": "macos",
        "nativeAppCapable": true,
        "supportsDeepLinks": true,
    });

    let (_, json) = post(app(), body, None).await;
    assert_eq!(json["launchMethod"], "web");
}

#[tokio::test]
async fn test_config_platform_is_served() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[launch]
fallback_timeout_ms = 4000

[[platforms]]
id = "tubi"
display_name = "Tubi"
web_base_url = "https://tubitv.com/movies/"
ios_scheme = "tubitv://media-details?contentId="
"#,
    )
    .unwrap();

    let body = json!({
        "platform": "Tubi",
        "contentId": "100",
        "contentType": "movie",
        "title": "Night of the Living Dead",
    });
    let (status, json) = post(app_with(&load_settings(&path)), body, Some(IPHONE_UA)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["primaryUrl"], "tubitv://media-details?contentId=100");
    assert_eq!(json["fallbackUrl"], "https://tubitv.com/movies/100");
    assert!(json["expectedBehavior"].as_str().unwrap().contains("4000"));
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(app(), Method::GET, HEALTH_PATH, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_fields_are_listed() {
    let (status, json) = post(app(), json!({ "platform": "netflix" }), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "missing_fields");
    assert_eq!(json["missing"], json!(["contentId", "contentType", "title"]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, json) = send(
        app(),
        Method::POST,
        DEEP_LINK_PATH,
        Some("{not json".to_string()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_body");
}

#[tokio::test]
async fn test_unknown_content_type_is_bad_request() {
    let mut body = netflix_request();
    body["contentType"] = json!("podcast");

    let (status, json) = post(app(), body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_content_type");
    assert!(json.get("missing").is_none());
}

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, json) = send(app(), method.clone(), DEEP_LINK_PATH, None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(json["error"], "method_not_allowed");
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (status, json) = send(app(), Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

struct FaultyService;

impl LaunchService for FaultyService {
    fn plan(&self, _request: &ResolveRequest, _device: &DeviceProfile) -> LaunchPlan {
        panic!("descriptor table corrupted")
    }

    fn race_config(&self) -> RaceConfig {
        RaceConfig::default()
    }

    async fn launch(&self, _plan: &LaunchPlan) -> LaunchOutcome {
        unreachable!("the endpoint never executes plans")
    }
}

#[tokio::test]
async fn test_internal_fault_is_generic_500() {
    let app = router(Arc::new(FaultyService));
    let (status, json) = post(app, netflix_request(), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert!(!json["message"].as_str().unwrap().contains("corrupted"));
}
