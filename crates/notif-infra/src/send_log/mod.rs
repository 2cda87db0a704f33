//! Send log store implementations - flat JSON file and in-memory.

mod file;
mod memory;

pub use file::JsonFileSendLog;
pub use memory::InMemorySendLog;
