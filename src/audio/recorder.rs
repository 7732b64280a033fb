use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Cursor;

use super::backend::AudioFrame;

/// Finalized single-track audio artifact for one turn.
///
/// This is exactly what goes on the wire: WAV bytes of the microphone
/// track only. Video is never mixed in; the interviewer service's speech
/// processing chokes on multiplexed payloads.
#[derive(Debug, Clone)]
pub struct TurnArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub sample_count: usize,
    pub finalized_at: DateTime<Utc>,
}

impl TurnArtifact {
    /// A short silent artifact, used as the payload of the best-effort
    /// disqualification report (the service requires an audio field).
    pub fn silent(sample_rate: u32, duration_ms: u64) -> Self {
        let mut recorder = TurnRecorder::new();
        let samples = (sample_rate as u64 * duration_ms / 1000) as usize;
        recorder.push(AudioFrame {
            samples: vec![0; samples],
            sample_rate,
            channels: 1,
            timestamp_ms: 0,
        });
        recorder
            .finalize()
            .expect("in-memory WAV encoding of silence cannot fail")
    }
}

/// Buffers captured frames for one press-to-stop recording cycle.
///
/// Frames are appended in arrival order; `finalize` is the sole way to
/// complete a turn and consumes the recorder, so a turn can never be
/// finalized twice.
pub struct TurnRecorder {
    frames: Vec<AudioFrame>,
    sample_count: usize,
}

impl TurnRecorder {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            sample_count: 0,
        }
    }

    pub fn push(&mut self, frame: AudioFrame) {
        self.sample_count += frame.samples.len();
        self.frames.push(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Encode everything buffered so far into one WAV artifact.
    pub fn finalize(self) -> Result<TurnArtifact> {
        let (sample_rate, channels) = self
            .frames
            .first()
            .map(|f| (f.sample_rate, f.channels))
            .unwrap_or((16000, 1));

        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV encoder")?;
            for frame in &self.frames {
                for &sample in &frame.samples {
                    writer
                        .write_sample(sample)
                        .context("Failed to write sample to WAV")?;
                }
            }
            writer.finalize().context("Failed to finalize WAV artifact")?;
        }

        Ok(TurnArtifact {
            bytes: cursor.into_inner(),
            mime_type: "audio/wav",
            sample_count: self.sample_count,
            finalized_at: Utc::now(),
        })
    }
}

impl Default for TurnRecorder {
    fn default() -> Self {
        Self::new()
    }
}
