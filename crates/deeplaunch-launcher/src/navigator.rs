//! Navigation seam between the launcher and the host environment.
//!
//! The launcher never knows whether a native handler exists. It only issues
//! a fire-and-forget native attempt and, when it decides to, asks the host to
//! open a web URL. The host may refuse that second request (pop-up blockers,
//! sandboxed webviews), which is reported as [`NavigationStatus::Blocked`].

use deeplaunch_core::prelude::*;

/// Whether the host carried out a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
    Opened,
    Blocked,
}

/// Host navigation operations.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Issue a native-scheme navigation attempt.
    ///
    /// Must return immediately and must never fail, whether or not a handler
    /// for the scheme is installed.
    fn attempt_native(&self, url: &str);

    /// Open a URL in the host's default handler.
    fn open(&self, url: &str) -> NavigationStatus;
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn attempt_native(&self, url: &str) {
        (**self).attempt_native(url)
    }

    fn open(&self, url: &str) -> NavigationStatus {
        (**self).open(url)
    }
}

/// Opens URLs through the operating system's registered handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn attempt_native(&self, url: &str) {
        // No handler for the scheme is an expected outcome here
        if let Err(e) = open::that_detached(url) {
            debug!("Native attempt for {} was not handled: {}", url, e);
        }
    }

    fn open(&self, url: &str) -> NavigationStatus {
        match open::that_detached(url) {
            Ok(()) => NavigationStatus::Opened,
            Err(e) => {
                warn!("{}", Error::navigation(url, e.to_string()));
                NavigationStatus::Blocked
            }
        }
    }
}

/// Logs navigations instead of performing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNavigator;

impl Navigator for DryRunNavigator {
    fn attempt_native(&self, url: &str) {
        info!("[dry-run] native attempt: {}", url);
    }

    fn open(&self, url: &str) -> NavigationStatus {
        info!("[dry-run] open: {}", url);
        NavigationStatus::Opened
    }
}
