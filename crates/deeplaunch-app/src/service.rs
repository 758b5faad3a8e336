//! Launch orchestration
//!
//! The `LaunchService` trait is the single entry point used by both the HTTP
//! endpoint and the CLI: resolve a request into a plan, then optionally
//! execute it.

use std::sync::Arc;

use deeplaunch_core::prelude::*;
use deeplaunch_core::{
    resolve_content, DeviceProfile, LaunchOutcome, LaunchPlan, PlatformRegistry,
};
use deeplaunch_launcher::{LaunchExecutor, Navigator, RaceConfig, VisibilityHub};

use crate::config::Settings;
use crate::wire::ResolveRequest;

/// Resolution and execution of deep-link hand-offs
#[trait_variant::make(LaunchService: Send)]
pub trait LocalLaunchService {
    /// Build the plan for `request` as seen from `device`
    fn plan(&self, request: &ResolveRequest, device: &DeviceProfile) -> LaunchPlan;

    /// Race settings plans will be executed with
    fn race_config(&self) -> RaceConfig;

    /// Perform the hand-off described by `plan`
    async fn launch(&self, plan: &LaunchPlan) -> LaunchOutcome;
}

/// Default implementation backed by a [`PlatformRegistry`] and a
/// [`LaunchExecutor`].
#[derive(Debug)]
pub struct DeepLinkService<N> {
    registry: Arc<PlatformRegistry>,
    executor: LaunchExecutor<N>,
}

impl<N: Navigator> DeepLinkService<N> {
    pub fn new(registry: Arc<PlatformRegistry>, navigator: N, race: RaceConfig) -> Self {
        Self {
            registry,
            executor: LaunchExecutor::new(navigator, VisibilityHub::new(), race),
        }
    }

    /// Build the service described by `settings`.
    ///
    /// Fails when the settings are invalid or a configured platform is
    /// malformed.
    pub fn from_settings(settings: &Settings, navigator: N) -> Result<Self> {
        settings.validate()?;
        let registry = PlatformRegistry::with_overrides(settings.platforms.clone())?;
        info!(
            "Platform registry ready: {} platforms ({} from config)",
            registry.len(),
            settings.platforms.len()
        );
        Ok(Self::new(
            Arc::new(registry),
            navigator,
            settings.launch.race_config(),
        ))
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Visibility signal the executor's races observe.
    pub fn visibility(&self) -> &VisibilityHub {
        self.executor.visibility()
    }

    /// Perform `plan` without racing, for hosts where nothing publishes to
    /// [`visibility`](Self::visibility).
    pub async fn hand_off(&self, plan: &LaunchPlan) -> LaunchOutcome {
        self.executor.hand_off(plan).await
    }
}

impl<N: Navigator> LaunchService for DeepLinkService<N> {
    fn plan(&self, request: &ResolveRequest, device: &DeviceProfile) -> LaunchPlan {
        let platform = self.registry.lookup(&request.platform);
        let plan = resolve_content(device, &platform, &request.content);
        debug!(
            "Resolved {} '{}' on {} for {}/{}: {} plan",
            request.content.content_type,
            request.content.id,
            platform.id,
            device.device_class,
            device.os,
            plan.method
        );
        plan
    }

    fn race_config(&self) -> RaceConfig {
        *self.executor.config()
    }

    async fn launch(&self, plan: &LaunchPlan) -> LaunchOutcome {
        self.executor.execute(plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::{DeepLinkService, LaunchService, ResolveRequest, Settings};
    use deeplaunch_core::{
        Browser, ContentRecord, ContentType, DeviceClass, DeviceProfile, LaunchDisposition,
        LaunchMethod, Os, PlatformDescriptor,
    };
    use deeplaunch_launcher::test_utils::{NavigationKind, RecordingNavigator};

    fn request(platform: &str, id: &str) -> ResolveRequest {
        ResolveRequest {
            platform: platform.to_string(),
            content: ContentRecord::new(id, ContentType::Movie, "Stranger Things"),
            device_info: None,
        }
    }

    fn iphone() -> DeviceProfile {
        DeviceProfile::new(DeviceClass::Mobile, Os::Ios, Browser::MobileSafari)
    }

    #[test]
    fn test_plan_for_known_platform() {
        let service =
            DeepLinkService::from_settings(&Settings::default(), RecordingNavigator::new())
                .unwrap();
        let plan = service.plan(&request("netflix", "80057281"), &iphone());
        assert_eq!(plan.primary_url, "nflx://www.netflix.com/title/80057281");
        assert_eq!(plan.fallback_url, "https://www.netflix.com/title/80057281");
        assert_eq!(plan.method, LaunchMethod::Hybrid);
    }

    #[test]
    fn test_config_platform_is_resolvable() {
        let mut settings = Settings::default();
        settings.platforms.push(
            PlatformDescriptor::new("tubi", "Tubi", "https://tubitv.com/movies/")
                .with_ios_scheme("tubitv://media-details?contentId="),
        );
        let service = DeepLinkService::from_settings(&settings, RecordingNavigator::new()).unwrap();

        assert!(service.registry().contains("tubi"));
        let plan = service.plan(&request("tubi", "123"), &iphone());
        assert_eq!(plan.primary_url, "tubitv://media-details?contentId=123");
        assert_eq!(plan.platform_display_name, "Tubi");
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.launch.fallback_timeout_ms = 0;
        assert!(DeepLinkService::from_settings(&settings, RecordingNavigator::new()).is_err());
    }

    #[test]
    fn test_race_config_comes_from_settings() {
        let mut settings = Settings::default();
        settings.launch.fallback_timeout_ms = 4000;
        let service = DeepLinkService::from_settings(&settings, RecordingNavigator::new()).unwrap();
        assert_eq!(service.race_config().fallback_timeout.as_millis(), 4000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_web_plan() {
        let nav = RecordingNavigator::new();
        let service = DeepLinkService::from_settings(&Settings::default(), nav.clone()).unwrap();
        let desktop = DeviceProfile::new(DeviceClass::Desktop, Os::MacOs, Browser::Safari);

        let plan = service.plan(&request("netflix", "1"), &desktop);
        let outcome = service.launch(&plan).await;

        assert_eq!(outcome.disposition, LaunchDisposition::Web);
        assert_eq!(
            nav.urls(NavigationKind::Open),
            vec!["https://www.netflix.com/title/1".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_hybrid_plan_observes_service_visibility() {
        let nav = RecordingNavigator::new();
        let service = DeepLinkService::from_settings(&Settings::default(), nav.clone()).unwrap();
        let plan = service.plan(&request("netflix", "1"), &iphone());

        let hide = async {
            tokio::time::sleep(std::time::Duration::from_millis(400)).await;
            service
                .visibility()
                .publish(deeplaunch_launcher::VisibilityState::Hidden);
        };
        let (outcome, ()) = tokio::join!(service.launch(&plan), hide);

        assert!(outcome.native_launched);
        assert!(nav.urls(NavigationKind::Open).is_empty());
    }
}
