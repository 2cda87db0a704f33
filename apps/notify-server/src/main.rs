//! # Notify Server
//!
//! HTTP entry point: accepts an email address and sends it a fixed
//! notification, subject to a per-address send limit.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod messages;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Notify Server on {}:{}{}",
        config.host,
        config.port,
        config.notify_path
    );

    let state = AppState::new(&config);
    let notify_path = config.notify_path.clone();

    HttpServer::new(move || {
        let notify_path = notify_path.clone();
        App::new()
            .wrap(middleware::cors())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, &notify_path))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
