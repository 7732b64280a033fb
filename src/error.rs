use thiserror::Error;

/// Failure taxonomy for a live interview session.
///
/// Every fallible suspension point (device acquisition, turn exchange,
/// speech playback) maps its failure into one of these variants at the
/// call site; nothing propagates to the host application as an
/// unclassified fault.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The candidate declined camera/microphone access, or no device
    /// exists. The interview cannot start; the host should show a
    /// permission prompt and let the candidate retry.
    #[error("camera/microphone access denied: {0}")]
    DeviceDenied(String),

    /// The voice activity gate never observed speech during the turn.
    /// Local and recoverable: the turn is discarded without a network
    /// call and the session stays ready.
    #[error("no speech detected during the recording")]
    NoSpeechDetected,

    /// The turn-exchange request never reached the interviewer service.
    #[error("turn exchange network failure: {0}")]
    Network(String),

    /// The interviewer service answered with a non-success status or an
    /// unreadable body.
    #[error("interviewer service error: {0}")]
    Remote(String),

    /// The session was terminated by the proctoring watchdog. Terminal;
    /// there is no retry path.
    #[error("session disqualified: {0}")]
    Disqualified(String),

    /// The requested action is not legal in the current session state
    /// (e.g. starting a recording while a response is in flight).
    #[error("invalid action in state {state}: {action}")]
    InvalidState { state: String, action: String },

    /// Unexpected local failure (e.g. artifact encoding).
    #[error("internal session failure: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
