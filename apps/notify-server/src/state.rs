//! Application state - shared across all handlers.

use std::sync::Arc;

use notif_core::SendRateLimiter;
use notif_core::domain::NotificationTemplate;
use notif_core::ports::{Clock, Mailer, SendLogStore, SystemClock};
use notif_infra::JsonFileSendLog;

use crate::config::AppConfig;
use crate::messages::Messages;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<SendRateLimiter>,
    /// `Err` holds the reason SMTP is unusable; it is reported per request.
    pub mailer: Result<Arc<dyn Mailer>, String>,
    pub template: NotificationTemplate,
    pub messages: Messages,
}

impl AppState {
    /// Build the application state with the file-backed log and SMTP relay.
    pub fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn SendLogStore> = Arc::new(JsonFileSendLog::new(&config.send_log_path));
        tracing::info!(path = %config.send_log_path.display(), "Send log configured");

        let mailer = build_mailer(config);
        if let Err(reason) = &mailer {
            tracing::error!(
                error = %reason,
                "SMTP is not usable; notification requests will be rejected"
            );
        }

        Self::with_parts(config, store, Arc::new(SystemClock), mailer)
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        config: &AppConfig,
        store: Arc<dyn SendLogStore>,
        clock: Arc<dyn Clock>,
        mailer: Result<Arc<dyn Mailer>, String>,
    ) -> Self {
        let limiter = SendRateLimiter::new(store, clock, config.rate_limit)
            .with_prune_on_write(config.prune_on_write);

        tracing::info!(
            max_attempts = config.rate_limit.max_attempts,
            window_secs = config.rate_limit.window_secs,
            prune_on_write = config.prune_on_write,
            locale = %config.locale,
            "Application state initialized"
        );

        Self {
            limiter: Arc::new(limiter),
            mailer,
            template: NotificationTemplate::for_locale(config.locale),
            messages: Messages::new(config.locale, config.expose_transport_errors),
        }
    }
}

#[cfg(feature = "smtp")]
fn build_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, String> {
    use notif_infra::SmtpMailer;

    let settings = config.smtp.as_ref().map_err(|e| e.to_string())?;
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        encryption = ?settings.encryption,
        "SMTP relay configured"
    );
    let mailer = SmtpMailer::new(settings).map_err(|e| e.to_string())?;
    Ok(Arc::new(mailer))
}

#[cfg(not(feature = "smtp"))]
fn build_mailer(_config: &AppConfig) -> Result<Arc<dyn Mailer>, String> {
    Err("built without the smtp feature".to_string())
}
