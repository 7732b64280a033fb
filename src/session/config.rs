use serde::{Deserialize, Serialize};

/// Parameters for one live interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-<uuid>")
    pub session_id: String,

    /// Candidate email, supplied by the embedding dashboard.
    /// Sent as "unknown" on the wire when absent.
    pub candidate_email: Option<String>,

    /// Job title the candidate is interviewing for
    pub job_title: Option<String>,

    /// Tab-hidden violations tolerated before disqualification
    pub violation_limit: u32,

    /// Rolling-average window of the voice activity gate, in frames
    pub vad_window_frames: usize,

    /// Normalized average-amplitude threshold for the voice activity gate
    pub vad_threshold: f32,

    /// Preferred synthesis voice; best-effort, backend may ignore it
    pub voice_hint: Option<String>,
}

impl SessionConfig {
    /// Greeting seeded into the transcript and spoken once on start.
    pub fn greeting(&self) -> String {
        format!(
            "Hello! I'm your AI interviewer today for the {} role. \
             When you're ready, press the microphone control and introduce yourself.",
            self.job_title.as_deref().unwrap_or("open")
        )
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            candidate_email: None,
            job_title: None,
            violation_limit: 2,
            vad_window_frames: 8,
            vad_threshold: 0.02,
            voice_hint: Some("Google US English".to_string()),
        }
    }
}
