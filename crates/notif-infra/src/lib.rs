//! # Notif Infrastructure
//!
//! Concrete implementations of the ports defined in `notif-core`.
//!
//! ## Feature Flags
//!
//! - `smtp` (default) - SMTP delivery via lettre

pub mod mail;
pub mod send_log;

// Re-exports
pub use mail::{SmtpConfigError, SmtpEncryption, SmtpSettings};
pub use send_log::{InMemorySendLog, JsonFileSendLog};

#[cfg(feature = "smtp")]
pub use mail::SmtpMailer;
