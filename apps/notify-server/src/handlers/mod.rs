//! HTTP handlers and route configuration.

mod health;
mod notify;

use actix_web::{HttpResponse, web};

use crate::middleware::NotifyError;
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, notify_path: &str) {
    cfg.route("/api/health", web::get().to(health::health_check))
        .service(
            // Every method reaches the handler, which answers non-POST
            // requests with a JSON error. CORS preflight never gets here.
            web::resource(notify_path).route(web::route().to(notify::send_notification)),
        );
}

/// Fallback for unknown routes.
pub async fn not_found(state: web::Data<AppState>) -> HttpResponse {
    NotifyError::NotFound.to_response(&state.messages)
}
