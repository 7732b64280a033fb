use anyhow::Result;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Average absolute amplitude normalized to 0.0..=1.0.
    ///
    /// This is the signal the voice activity detector thresholds. It is
    /// deliberately crude (no spectral analysis) because it only has to
    /// separate "somebody talked" from "the room was silent".
    pub fn mean_amplitude(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .samples
            .iter()
            .map(|&s| (s as f64).abs() / i16::MAX as f64)
            .sum();
        (sum / self.samples.len() as f64) as f32
    }
}

/// One webcam frame, forwarded to the proctoring preview.
/// The pixel payload is opaque to this crate and is never uploaded.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Constraints passed to the capture backend when devices are requested.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate for captured audio
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
    /// Echo cancellation keeps the interviewer's own played-back speech
    /// out of the candidate's microphone capture.
    pub echo_cancellation: bool,
    /// Ask the device for noise suppression
    pub noise_suppression: bool,
    /// Ask the device for automatic gain control
    pub auto_gain: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain: true,
        }
    }
}

/// Live device handles produced by a successful acquisition.
pub struct MediaStreams {
    /// Microphone frames
    pub audio_rx: mpsc::Receiver<AudioFrame>,
    /// Webcam frames for the proctoring preview
    pub video_rx: mpsc::Receiver<VideoFrame>,
    /// Human-readable label of the active microphone, for logging
    pub device_label: String,
}

/// Device capture backend trait
///
/// Wraps whatever platform media layer hosts this component. Tests
/// substitute a scripted implementation; session logic never touches
/// device APIs directly.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Request combined audio+video access and start capturing.
    ///
    /// Returns channel receivers that deliver frames until `release` is
    /// called. An error here means the candidate declined access or no
    /// device exists; the session maps it to `DeviceDenied`.
    async fn acquire(&mut self, config: &CaptureConfig) -> Result<MediaStreams>;

    /// Stop all tracks and free the devices. Must be idempotent.
    async fn release(&mut self) -> Result<()>;

    /// Check if devices are currently held
    fn is_live(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
