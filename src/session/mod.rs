//! Live interview session management
//!
//! This module provides the `InterviewSession` abstraction that manages:
//! - The session state machine (pre-start through terminal outcomes)
//! - Turn lifecycle: record, VAD gate, exchange, playback
//! - The append-only conversation transcript
//! - Violation counting and disqualification
//! - Session events and statistics for the embedding UI

mod config;
mod controller;
mod state;

pub use config::SessionConfig;
pub use controller::InterviewSession;
pub use state::{
    SessionEvent, SessionState, SessionStats, Speaker, TranscriptEntry, ViolationRecord,
};
