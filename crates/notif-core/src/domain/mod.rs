//! Domain types - pure business logic, no I/O.

mod email;
mod locale;
mod notification;
mod rate_limit;
mod send_log;
mod wait_time;

pub use email::{EmailAddress, normalize_key};
pub use locale::{Locale, UnknownLocale};
pub use notification::{NotificationTemplate, OutgoingEmail, strip_markup};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy};
pub use send_log::SendLog;
pub use wait_time::{TimeLabels, format_wait};
