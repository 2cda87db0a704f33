//! # Notif Core
//!
//! The domain layer of the notification service.
//! This crate holds the rate-limiting rules, address validation and the
//! notification template. Storage, mail transport and time are reached only
//! through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod limiter;
pub mod ports;

pub use error::EmailError;
pub use limiter::SendRateLimiter;
