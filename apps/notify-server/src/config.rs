//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use notif_core::domain::{Locale, RateLimitPolicy};
use notif_infra::{SmtpConfigError, SmtpSettings};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Path the notification endpoint is mounted on.
    pub notify_path: String,
    pub send_log_path: PathBuf,
    pub rate_limit: RateLimitPolicy,
    pub prune_on_write: bool,
    pub locale: Locale,
    /// Include relay error text in dispatch failure messages.
    pub expose_transport_errors: bool,
    /// A bad SMTP configuration does not stop the server; every request
    /// reports it instead.
    pub smtp: Result<SmtpSettings, SmtpConfigError>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RateLimitPolicy::default();

        let locale = match lookup("MESSAGE_LOCALE") {
            Some(raw) => raw.parse::<Locale>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to the default message locale");
                Locale::default()
            }),
            None => Locale::default(),
        };

        let mut notify_path = lookup("NOTIFY_PATH").unwrap_or_else(|| "/api/notify".to_string());
        if !notify_path.starts_with('/') {
            notify_path.insert(0, '/');
        }

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            notify_path,
            send_log_path: lookup("SEND_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs/email_log.json")),
            rate_limit: RateLimitPolicy::new(
                lookup("RATE_LIMIT_MAX_ATTEMPTS")
                    .and_then(|s| s.parse::<u32>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.max_attempts),
                lookup("RATE_LIMIT_WINDOW_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.window_secs),
            ),
            prune_on_write: lookup("RATE_LIMIT_PRUNE_ON_WRITE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            locale,
            expose_transport_errors: lookup("EXPOSE_TRANSPORT_ERRORS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            smtp: SmtpSettings::from_lookup(&lookup),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
