//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// The notification form: a single `email` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyForm {
    #[serde(default)]
    pub email: Option<String>,
}

impl NotifyForm {
    /// Build from decoded form pairs. A repeated `email` keeps the last value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            email: pairs
                .into_iter()
                .filter(|(name, _)| name == "email")
                .map(|(_, value)| value)
                .last(),
        }
    }
}

/// Payload of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentNotification {
    pub email: String,
    /// Sends left in the current window after this one.
    pub remaining: u32,
}
