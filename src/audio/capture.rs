use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig, VideoFrame};
use crate::error::{SessionError, SessionResult};

const FANOUT_CAPACITY: usize = 256;

/// Owns the camera+microphone handles for the lifetime of a session.
///
/// Devices are acquired once and cached; every turn reuses the same
/// handle (re-requesting is only a fallback when the handle was
/// unexpectedly lost). Frames are fanned out over broadcast channels so
/// the recorder and the proctoring preview can each subscribe without
/// taking ownership of the stream. `release` is idempotent and aborts
/// the pump tasks before freeing the devices.
pub struct CaptureManager {
    backend: Box<dyn CaptureBackend>,
    config: CaptureConfig,
    live: Option<LiveStreams>,
}

struct LiveStreams {
    audio_tx: broadcast::Sender<AudioFrame>,
    video_tx: broadcast::Sender<VideoFrame>,
    audio_pump: JoinHandle<()>,
    video_pump: JoinHandle<()>,
}

impl CaptureManager {
    pub fn new(backend: Box<dyn CaptureBackend>, config: CaptureConfig) -> Self {
        Self {
            backend,
            config,
            live: None,
        }
    }

    /// Request devices, or reuse the cached handle if already held.
    pub async fn acquire(&mut self) -> SessionResult<()> {
        if self.live.is_some() {
            return Ok(());
        }

        let streams = self
            .backend
            .acquire(&self.config)
            .await
            .map_err(|e| SessionError::DeviceDenied(format!("{e:#}")))?;

        info!(
            backend = self.backend.name(),
            device = %streams.device_label,
            "Capture devices acquired"
        );

        let (audio_tx, _) = broadcast::channel(FANOUT_CAPACITY);
        let (video_tx, _) = broadcast::channel(FANOUT_CAPACITY);

        let mut audio_rx = streams.audio_rx;
        let audio_fanout = audio_tx.clone();
        let audio_pump = tokio::spawn(async move {
            while let Some(frame) = audio_rx.recv().await {
                // Send errors just mean nobody is listening right now.
                let _ = audio_fanout.send(frame);
            }
        });

        let mut video_rx = streams.video_rx;
        let video_fanout = video_tx.clone();
        let video_pump = tokio::spawn(async move {
            while let Some(frame) = video_rx.recv().await {
                let _ = video_fanout.send(frame);
            }
        });

        self.live = Some(LiveStreams {
            audio_tx,
            video_tx,
            audio_pump,
            video_pump,
        });

        Ok(())
    }

    /// Subscribe to live microphone frames (one subscription per turn).
    pub fn audio_frames(&self) -> SessionResult<broadcast::Receiver<AudioFrame>> {
        match &self.live {
            Some(streams) => Ok(streams.audio_tx.subscribe()),
            None => Err(SessionError::InvalidState {
                state: "released".to_string(),
                action: "subscribe to audio frames".to_string(),
            }),
        }
    }

    /// Subscribe to the webcam feed for the proctoring preview.
    pub fn video_frames(&self) -> SessionResult<broadcast::Receiver<VideoFrame>> {
        match &self.live {
            Some(streams) => Ok(streams.video_tx.subscribe()),
            None => Err(SessionError::InvalidState {
                state: "released".to_string(),
                action: "subscribe to video frames".to_string(),
            }),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Stop all tracks and free the devices. Safe to call repeatedly.
    pub async fn release(&mut self) {
        let Some(streams) = self.live.take() else {
            return;
        };

        streams.audio_pump.abort();
        streams.video_pump.abort();

        if let Err(e) = self.backend.release().await {
            warn!("Capture backend release failed: {e:#}");
        }

        info!(backend = self.backend.name(), "Capture devices released");
    }
}
