//! End-to-end hand-off: classify, resolve, then race the native attempt
//! against the web fallback under paused tokio time.

use std::time::Duration;

use deeplaunch_app::{DeepLinkService, LaunchService, ResolveRequest, Settings};
use deeplaunch_core::{
    ContentRecord, ContentType, DeviceProfile, EnvironmentSignals, LaunchDisposition, LaunchMethod,
};
use deeplaunch_launcher::test_utils::{NavigationKind, RecordingNavigator};
use deeplaunch_launcher::{pump_lines, VisibilityState};

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
const PIXEL_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn netflix(id: &str) -> ResolveRequest {
    ResolveRequest {
        platform: "netflix".to_string(),
        content: ContentRecord::new(id, ContentType::Movie, "Extraction"),
        device_info: None,
    }
}

fn device(user_agent: &str) -> DeviceProfile {
    EnvironmentSignals::from_user_agent(user_agent).classify()
}

fn service(settings: &Settings) -> (DeepLinkService<RecordingNavigator>, RecordingNavigator) {
    let nav = RecordingNavigator::new();
    let service = DeepLinkService::from_settings(settings, nav.clone()).unwrap();
    (service, nav)
}

#[tokio::test(start_paused = true)]
async fn test_missing_app_falls_back_after_timeout() {
    let (service, nav) = service(&Settings::default());
    let plan = service.plan(&netflix("80057281"), &device(IPHONE_UA));
    assert_eq!(plan.method, LaunchMethod::Hybrid);

    let outcome = service.launch(&plan).await;

    assert!(!outcome.native_launched);
    assert_eq!(outcome.disposition, LaunchDisposition::Fallback);
    assert!(outcome.elapsed >= ms(2500) && outcome.elapsed < ms(2600));
    assert_eq!(
        nav.history(),
        vec![
            (
                NavigationKind::NativeAttempt,
                "nflx://www.netflix.com/title/80057281".to_string()
            ),
            (
                NavigationKind::Open,
                "https://www.netflix.com/title/80057281".to_string()
            ),
        ]
    );
    assert_eq!(service.visibility().observer_count(), 0);

    // Visibility changes after resolution open nothing
    service.visibility().publish(VisibilityState::Hidden);
    tokio::time::sleep(ms(5000)).await;
    assert_eq!(nav.urls(NavigationKind::Open).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_app_taking_foreground_suppresses_fallback() {
    let (service, nav) = service(&Settings::default());
    let plan = service.plan(&netflix("80057281"), &device(IPHONE_UA));

    let app_opens = async {
        tokio::time::sleep(ms(600)).await;
        service.visibility().publish(VisibilityState::Hidden);
    };
    let (outcome, ()) = tokio::join!(service.launch(&plan), app_opens);

    assert!(outcome.native_launched);
    assert_eq!(outcome.disposition, LaunchDisposition::Native);
    assert!(outcome.elapsed >= ms(600) && outcome.elapsed < ms(700));

    tokio::time::sleep(ms(3000)).await;
    assert!(nav.urls(NavigationKind::Open).is_empty());
    assert_eq!(nav.urls(NavigationKind::NativeAttempt).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_line_reports_drive_the_race() {
    let (service, nav) = service(&Settings::default());
    let plan = service.plan(&netflix("80057281"), &device(IPHONE_UA));

    let wrapper_reports = async {
        tokio::time::sleep(ms(500)).await;
        pump_lines(&b"visible\nhidden\n"[..], service.visibility())
    };
    let (outcome, reports) = tokio::join!(service.launch(&plan), wrapper_reports);

    assert_eq!(reports, 2);
    assert_eq!(outcome.disposition, LaunchDisposition::Native);
    tokio::time::sleep(ms(5000)).await;
    assert!(nav.urls(NavigationKind::Open).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hand_off_without_visibility_source_opens_only_the_app() {
    let (service, nav) = service(&Settings::default());
    let plan = service.plan(&netflix("80057281"), &device(IPHONE_UA));
    assert!(plan.requires_race);

    let outcome = service.hand_off(&plan).await;

    assert!(!outcome.native_launched);
    assert_eq!(outcome.disposition, LaunchDisposition::HandedOff);
    assert!(!outcome.status_message(&plan).contains("didn't open"));
    tokio::time::sleep(ms(5000)).await;
    assert_eq!(
        nav.history(),
        vec![(
            NavigationKind::NativeAttempt,
            "nflx://www.netflix.com/title/80057281".to_string()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn test_android_intent_layered_fallback() {
    let (service, nav) = service(&Settings::default());
    let plan = service.plan(&netflix("80057281"), &device(PIXEL_UA));
    assert!(plan.primary_url.starts_with("intent://"));

    let outcome = service.launch(&plan).await;

    assert_eq!(outcome.disposition, LaunchDisposition::Fallback);
    assert_eq!(
        nav.urls(NavigationKind::Open),
        vec!["https://www.netflix.com/title/80057281".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_android_intent_only_policy_defers_to_browser() {
    let settings: Settings = toml_settings("[launch]\nintent_fallback = \"intent_only\"\n");
    let (service, nav) = service(&settings);
    let plan = service.plan(&netflix("80057281"), &device(PIXEL_UA));

    let outcome = service.launch(&plan).await;

    assert!(!outcome.native_launched);
    assert_eq!(outcome.disposition, LaunchDisposition::DeferredToIntent);
    assert!(nav.urls(NavigationKind::Open).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeout_is_used() {
    let settings = toml_settings("[launch]\nfallback_timeout_ms = 1000\n");
    let (service, _nav) = service(&settings);
    let plan = service.plan(&netflix("1"), &device(IPHONE_UA));

    let outcome = service.launch(&plan).await;
    assert_eq!(outcome.disposition, LaunchDisposition::Fallback);
    assert!(outcome.elapsed >= ms(1000) && outcome.elapsed < ms(1100));
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_launches_are_isolated() {
    let (service, nav) = service(&Settings::default());
    let first = service.plan(&netflix("first"), &device(IPHONE_UA));
    let second = service.plan(&netflix("second"), &device(IPHONE_UA));

    // First launch times out at 2500ms and detaches; the hide at 2700ms only
    // reaches the second launch, 1700ms into its own race
    let run_second = async {
        tokio::time::sleep(ms(1000)).await;
        service.launch(&second).await
    };
    let hide = async {
        tokio::time::sleep(ms(2700)).await;
        service.visibility().publish(VisibilityState::Hidden)
    };
    let (a, b, delivered) = tokio::join!(service.launch(&first), run_second, hide);

    assert_eq!(a.disposition, LaunchDisposition::Fallback);
    assert_eq!(b.disposition, LaunchDisposition::Native);
    assert_eq!(delivered, 1);
    assert_eq!(
        nav.urls(NavigationKind::Open),
        vec!["https://www.netflix.com/title/first".to_string()]
    );
    assert_eq!(service.visibility().observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_desktop_opens_web_without_racing() {
    let (service, nav) = service(&Settings::default());
    let mac = device(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    );
    let plan = service.plan(&netflix("1"), &mac);

    let outcome = service.launch(&plan).await;

    assert_eq!(outcome.disposition, LaunchDisposition::Web);
    assert_eq!(outcome.elapsed, Duration::ZERO);
    assert!(nav.urls(NavigationKind::NativeAttempt).is_empty());
    assert_eq!(
        nav.urls(NavigationKind::Open),
        vec!["https://www.netflix.com/title/1".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_blocked_fallback_is_suppressed() {
    let nav = RecordingNavigator::blocking();
    let service = DeepLinkService::from_settings(&Settings::default(), nav.clone()).unwrap();
    let plan = service.plan(&netflix("1"), &device(IPHONE_UA));

    let outcome = service.launch(&plan).await;

    assert!(!outcome.native_launched);
    assert_eq!(outcome.disposition, LaunchDisposition::Suppressed);
    assert!(outcome.status_message(&plan).contains(&plan.fallback_url));
}

fn toml_settings(content: &str) -> Settings {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    deeplaunch_app::load_settings(&path)
}
