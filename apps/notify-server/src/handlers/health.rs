//! Health check endpoint.

use actix_web::{HttpResponse, http::header, web};
use serde::Serialize;

use crate::middleware::error::JSON_UTF8;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// False when SMTP settings were rejected at startup.
    pub smtp_configured: bool,
    pub max_attempts: u32,
    pub window_secs: u64,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let policy = state.limiter.policy();
    let response = HealthResponse {
        status: if state.mailer.is_ok() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        smtp_configured: state.mailer.is_ok(),
        max_attempts: policy.max_attempts,
        window_secs: policy.window_secs,
    };

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, JSON_UTF8))
        .json(response)
}
