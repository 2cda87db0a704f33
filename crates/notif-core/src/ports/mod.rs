//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod mailer;
mod send_log;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mailer::{DispatchError, Mailer};
pub use send_log::{SendLogMutation, SendLogStore, StoreError};
