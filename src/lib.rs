pub mod audio;
pub mod config;
pub mod error;
pub mod exchange;
pub mod proctor;
pub mod session;
pub mod speech;

pub use audio::{
    AudioFrame, CaptureBackend, CaptureConfig, CaptureManager, LiveLevel, MediaStreams,
    TurnArtifact, TurnRecorder, VideoFrame, VoiceActivityDetector,
};
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use exchange::{HttpTurnClient, TurnExchange, TurnOutcome, TurnUpload};
pub use proctor::{NoticeSchedule, ProctorSignal, Watchdog};
pub use session::{
    InterviewSession, SessionConfig, SessionEvent, SessionState, SessionStats, Speaker,
    TranscriptEntry,
};
pub use speech::{SpeakOutcome, SpeechBackend, SpeechOutput};
