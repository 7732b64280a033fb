use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub interviewer: InterviewerConfig,
    pub audio: AudioConfig,
    pub proctor: ProctorConfig,
}

/// Connection settings for the remote interviewer service.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewerConfig {
    /// Base URL of the interviewer API (the turn endpoint is
    /// `{base_url}/interview/process`).
    pub base_url: String,
    /// Request timeout for one turn exchange, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Rolling-average window of the voice activity detector, in frames.
    #[serde(default = "default_vad_window")]
    pub vad_window_frames: usize,
    /// Normalized average-amplitude threshold above which a turn counts
    /// as containing speech.
    #[serde(default = "default_vad_threshold")]
    pub vad_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProctorConfig {
    /// Tab-hidden violations tolerated before disqualification.
    #[serde(default = "default_violation_limit")]
    pub violation_limit: u32,
    /// Seconds between cosmetic integrity-check notices.
    #[serde(default = "default_notice_interval")]
    pub notice_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_vad_window() -> usize {
    8
}

fn default_vad_threshold() -> f32 {
    0.02
}

fn default_violation_limit() -> u32 {
    2
}

fn default_notice_interval() -> u64 {
    45
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
