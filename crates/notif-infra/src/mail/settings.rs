//! SMTP relay settings, loaded once at startup and never mutated.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use notif_core::domain::EmailAddress;

/// How the session to the relay is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    /// Implicit TLS from the first byte (SMTPS, usually port 465).
    Ssl,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    Tls,
}

impl FromStr for SmtpEncryption {
    type Err = SmtpConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssl" | "smtps" => Ok(Self::Ssl),
            "tls" | "starttls" => Ok(Self::Tls),
            other => Err(SmtpConfigError::InvalidEncryption(other.to_string())),
        }
    }
}

/// SMTP configuration errors - deployment faults, not user errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmtpConfigError {
    #[error("SMTP host is not configured")]
    MissingHost,

    #[error("SMTP username and password must both be set")]
    MissingCredentials,

    #[error("Invalid SMTP port: {0}")]
    InvalidPort(String),

    #[error("Invalid SMTP encryption mode {0:?}, expected 'ssl' or 'tls'")]
    InvalidEncryption(String),

    #[error("Invalid sender address: {0}")]
    InvalidSender(String),

    #[error("Invalid SMTP debug level: {0}")]
    InvalidDebug(String),

    #[error("Invalid SMTP timeout: {0}")]
    InvalidTimeout(String),
}

/// Static relay configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub encryption: SmtpEncryption,
    /// Send credentials to the relay.
    pub auth: bool,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// 0 is silent, 4 is the most verbose.
    pub debug: u8,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("encryption", &self.encryption)
            .field("auth", &self.auth)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpSettings {
    /// Load settings from `SMTP_*` environment variables.
    pub fn from_env() -> Result<Self, SmtpConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmtpConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("SMTP_HOST").ok_or(SmtpConfigError::MissingHost)?;

        // Credentials are required even when auth is disabled.
        let username = get("SMTP_USERNAME").ok_or(SmtpConfigError::MissingCredentials)?;
        let password = lookup("SMTP_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or(SmtpConfigError::MissingCredentials)?;

        let port = match get("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(SmtpConfigError::InvalidPort(raw))?,
            None => 465,
        };

        let encryption = match get("SMTP_SECURE") {
            Some(raw) => raw.parse()?,
            None => SmtpEncryption::Ssl,
        };

        let auth = get("SMTP_AUTH")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);

        let from_email = get("SMTP_FROM_EMAIL").unwrap_or_else(|| username.clone());
        EmailAddress::parse(&from_email)
            .map_err(|_| SmtpConfigError::InvalidSender(from_email.clone()))?;

        let debug = match get("SMTP_DEBUG") {
            Some(raw) => parse_debug_level(&raw)?,
            None => 0,
        };

        let timeout = match get("SMTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(SmtpConfigError::InvalidTimeout(raw))?,
            None => Duration::from_secs(30),
        };

        Ok(Self {
            host,
            port,
            encryption,
            auth,
            username,
            password,
            from_email,
            from_name: get("SMTP_FROM_NAME").unwrap_or_else(|| "Web Notification Admin".to_string()),
            debug,
            timeout,
        })
    }
}

/// `false`/`0` is silent, `true` means level 2, numbers are clamped to 4.
fn parse_debug_level(raw: &str) -> Result<u8, SmtpConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "false" | "off" => Ok(0),
        "true" | "on" => Ok(2),
        other => other
            .parse::<u8>()
            .map(|level| level.min(4))
            .map_err(|_| SmtpConfigError::InvalidDebug(raw.to_string())),
    }
}
