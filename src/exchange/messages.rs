use serde::{Deserialize, Serialize};

use crate::audio::TurnArtifact;

/// One finalized turn on its way to the interviewer service.
#[derive(Debug, Clone)]
pub struct TurnUpload {
    /// Single-track audio artifact for this turn
    pub artifact: TurnArtifact,
    /// Candidate identifier; the wire default is "unknown" when absent
    pub candidate_email: Option<String>,
    /// Job identifier; the wire default is "unknown" when absent
    pub job_title: Option<String>,
    /// Full conversation so far, one `{SPEAKER}: {text}` line per entry
    pub history: String,
}

impl TurnUpload {
    pub fn candidate_field(&self) -> &str {
        self.candidate_email.as_deref().unwrap_or("unknown")
    }

    pub fn job_field(&self) -> &str {
        self.job_title.as_deref().unwrap_or("unknown")
    }
}

/// What the interviewer service said about one turn.
///
/// Absent `transcript`/`response` fields mean "nothing to append", not
/// an error. `is_terminated` ends the interview successfully; it is
/// unrelated to disqualification, which is decided client-side only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnOutcome {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub is_terminated: bool,
}
