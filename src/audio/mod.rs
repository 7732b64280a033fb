pub mod backend;
pub mod capture;
pub mod recorder;
pub mod vad;

pub use backend::{AudioFrame, CaptureBackend, CaptureConfig, MediaStreams, VideoFrame};
pub use capture::CaptureManager;
pub use recorder::{TurnArtifact, TurnRecorder};
pub use vad::{LiveLevel, VoiceActivityDetector};
