//! Mail dispatch port.

use async_trait::async_trait;

use crate::domain::OutgoingEmail;

/// Mailer trait - delivers one message through a relay.
///
/// A single attempt: implementations never retry. Recipients have already
/// passed address validation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError>;
}

/// Failure to hand a message to the relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("{0}")]
    Transport(String),
}
