//! Middleware modules.

pub mod cors;
pub mod error;

pub use cors::cors;
pub use error::{NotifyError, NotifyResult};
