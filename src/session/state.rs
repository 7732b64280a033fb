use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one interview session.
///
/// `Finished` and `Disqualified` are terminal: devices are released on
/// entry and every later action is rejected. `Disqualified` is reachable
/// from any non-terminal state; everything else follows the turn cycle
/// `Ready -> Recording -> AwaitingResponse -> Speaking -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Devices not yet granted
    PreStart,
    /// Devices held, awaiting candidate action
    Ready,
    /// A turn is being captured
    Recording,
    /// A turn was uploaded; the interviewer's reply is in flight
    AwaitingResponse,
    /// The interviewer's reply is being played back
    Speaking,
    /// The interviewer ended the session normally
    Finished,
    /// The proctoring watchdog terminated the session
    Disqualified,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Disqualified)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionState::PreStart => "pre_start",
            SessionState::Ready => "ready",
            SessionState::Recording => "recording",
            SessionState::AwaitingResponse => "awaiting_response",
            SessionState::Speaking => "speaking",
            SessionState::Finished => "finished",
            SessionState::Disqualified => "disqualified",
        }
    }
}

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Candidate,
    Interviewer,
}

impl Speaker {
    /// Label used in the transcript history sent to the interviewer
    /// service. The service's prompt contract expects `USER`/`AI`.
    pub fn wire_label(self) -> &'static str {
        match self {
            Speaker::Candidate => "USER",
            Speaker::Interviewer => "AI",
        }
    }
}

/// One immutable line of the conversation log.
///
/// Appended only by the session controller, in strict chronological
/// order; never edited or removed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// The `{SPEAKER}: {text}` form used for the wire history.
    pub fn wire_line(&self) -> String {
        format!("{}: {}", self.speaker.wire_label(), self.text)
    }
}

/// Integrity violations for one session.
///
/// The count only grows, and once the disqualified latch is set it never
/// resets for the life of the session.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ViolationRecord {
    count: u32,
    disqualified: bool,
}

impl ViolationRecord {
    /// Record one violation, returning the new count.
    pub fn record(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn latch(&mut self) {
        self.disqualified = true;
    }

    pub fn is_disqualified(&self) -> bool {
        self.disqualified
    }
}

/// Notifications pushed to the embedding UI over the session's event
/// channel. Pure output; nothing the host sends back flows through here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SessionEvent {
    StateChanged { state: SessionState },
    TranscriptAppended { entry: TranscriptEntry },
    /// Tab-hidden strike below the disqualification limit
    StrikeWarning { count: u32, limit: u32 },
    /// Cosmetic integrity-check notice; carries no state effect
    IntegrityNotice { message: String },
    FullscreenChanged { active: bool },
}

/// Point-in-time snapshot for the embedding dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub violation_count: u32,
    pub disqualified: bool,
    pub transcript_len: usize,
}
