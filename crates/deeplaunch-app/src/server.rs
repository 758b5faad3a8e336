//! HTTP launch endpoint
//!
//! Routes:
//! - `POST /api/deep-link` - Resolve a launch request into a plan
//! - `GET /health` - Liveness probe
//!
//! The endpoint only resolves. Executing the plan needs the requesting
//! client's navigation and visibility signals, so it happens client-side.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use deeplaunch_core::prelude::*;
use deeplaunch_core::{classify, DeviceProfile};

use crate::service::LaunchService;
use crate::wire::{LaunchRequest, LaunchResponse, RequestError, ResolveRequest};

pub const DEEP_LINK_PATH: &str = "/api/deep-link";
pub const HEALTH_PATH: &str = "/health";

/// Build the endpoint router around `service`.
pub fn router<S>(service: Arc<S>) -> Router
where
    S: LaunchService + Send + Sync + 'static,
{
    Router::new()
        .route(
            DEEP_LINK_PATH,
            post(deep_link::<S>).fallback(method_not_allowed),
        )
        .route(HEALTH_PATH, get(health))
        .fallback(not_found)
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve<S>(service: Arc<S>, addr: &str) -> Result<()>
where
    S: LaunchService + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::bind(addr, e.to_string()))?;
    let local = listener.local_addr()?;
    info!("Launch endpoint listening on http://{}{}", local, DEEP_LINK_PATH);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(e.to_string()))?;

    info!("Launch endpoint stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl+C ({}); serving until killed", e);
            std::future::pending::<()>().await;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn deep_link<S>(
    State(service): State<Arc<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<LaunchResponse>, ApiError>
where
    S: LaunchService + Send + Sync + 'static,
{
    let request: LaunchRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let request = request.validate()?;
    let device = device_for(&request, &headers);

    let plan = catch_unwind(AssertUnwindSafe(|| service.plan(&request, &device)))
        .map_err(|panic| ApiError::Internal(panic_message(panic.as_ref())))?;

    debug!(
        "{} {} '{}' -> {} {}",
        DEEP_LINK_PATH, request.platform, request.content.id, plan.method, plan.primary_url
    );

    Ok(Json(LaunchResponse::from_plan(
        &plan,
        &service.race_config(),
        !device.is_safe_default(),
    )))
}

/// Client-reported profile first, then the `User-Agent` header.
fn device_for(request: &ResolveRequest, headers: &HeaderMap) -> DeviceProfile {
    if let Some(device) = request.device_info {
        return device;
    }
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());
    classify(user_agent, None, None, false)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Endpoint failure, rendered as `{ error, message, missing? }`.
#[derive(Debug)]
pub enum ApiError {
    /// Body is not a JSON object of the expected shape
    InvalidBody(String),
    Request(RequestError),
    MethodNotAllowed,
    NotFound,
    /// Detail is logged, never returned
    Internal(String),
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError::Request(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::Request(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::InvalidBody(detail) => ErrorBody {
                error: "invalid_body",
                message: format!("Request body must be a JSON object: {}", detail),
                missing: None,
            },
            ApiError::Request(e) => {
                let message = e.to_string();
                match e {
                    RequestError::MissingFields(fields) => ErrorBody {
                        error: "missing_fields",
                        message,
                        missing: Some(fields),
                    },
                    RequestError::InvalidContentType(_) => ErrorBody {
                        error: "invalid_content_type",
                        message,
                        missing: None,
                    },
                }
            }
            ApiError::MethodNotAllowed => ErrorBody {
                error: "method_not_allowed",
                message: format!("{} only accepts POST", DEEP_LINK_PATH),
                missing: None,
            },
            ApiError::NotFound => ErrorBody {
                error: "not_found",
                message: "No such endpoint".to_string(),
                missing: None,
            },
            ApiError::Internal(detail) => {
                error!("Deep-link request failed: {}", detail);
                ErrorBody {
                    error: "internal_error",
                    message: "Something went wrong while building the link.".to_string(),
                    missing: None,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
