//! Request/response contract with the remote AI interviewer.
//!
//! One call per turn: the finalized audio artifact plus the cumulative
//! transcript context go out, `{transcript, response, is_terminated}`
//! comes back. The trait exists so tests can script the interviewer.

pub mod client;
pub mod messages;

pub use client::HttpTurnClient;
pub use messages::{TurnOutcome, TurnUpload};

use crate::error::SessionResult;

/// Turn exchange trait
#[async_trait::async_trait]
pub trait TurnExchange: Send + Sync {
    /// Send one finalized turn and wait for the interviewer's reply.
    async fn send(&self, upload: TurnUpload) -> SessionResult<TurnOutcome>;
}
