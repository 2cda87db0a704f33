//! Mail dispatch - SMTP relay settings and transport.

mod settings;

pub use settings::{SmtpConfigError, SmtpEncryption, SmtpSettings};

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;
