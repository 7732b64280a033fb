//! Integrity monitoring running alongside the conversation flow.

pub mod notifier;
pub mod watchdog;

pub use notifier::NoticeSchedule;
pub use watchdog::{ProctorSignal, Watchdog};
