//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
///
/// Resolution itself never produces an error: unknown platforms and missing
/// device signals degrade to usable plans. These variants cover the ambient
/// layers around it (configuration, the HTTP surface, logging, navigation).
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Launch Surface Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Server error: {message}")]
    Server { message: String },

    #[error("Failed to bind launch endpoint to {addr}: {reason}")]
    Bind { addr: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Navigation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn bind(addr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Bind {
            addr: addr.into(),
            reason: reason.into(),
        }
    }

    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::config_invalid("launch.fallback_timeout_ms must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: launch.fallback_timeout_ms must be greater than zero"
        );

        let err = Error::bind("127.0.0.1:80", "permission denied");
        assert!(err.to_string().contains("127.0.0.1:80"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
