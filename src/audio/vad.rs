//! Voice activity detection for the per-turn speech gate.
//!
//! Maintains a rolling average of frame energy while a turn is being
//! recorded. If the average ever crosses the threshold, the turn is
//! marked as containing speech; silent turns are discarded locally
//! instead of being uploaded to the interviewer service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::backend::AudioFrame;

/// Shared live input level for the host UI's meter/visualizer.
///
/// Written by the capture loop, read from the UI side without locking.
#[derive(Clone, Debug, Default)]
pub struct LiveLevel {
    level_bits: Arc<AtomicU32>,
}

impl LiveLevel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, level: f32) {
        self.level_bits.store(level.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.level_bits.load(Ordering::Relaxed))
    }
}

/// Rolling-average speech detector, reset at the start of every turn.
pub struct VoiceActivityDetector {
    window: VecDeque<f32>,
    window_frames: usize,
    threshold: f32,
    speech_observed: bool,
    level: LiveLevel,
}

impl VoiceActivityDetector {
    pub fn new(window_frames: usize, threshold: f32) -> Self {
        Self {
            window: VecDeque::new(),
            window_frames: window_frames.max(1),
            threshold,
            speech_observed: false,
            level: LiveLevel::new(),
        }
    }

    /// Handle to the live level meter shared with the UI.
    pub fn level(&self) -> LiveLevel {
        self.level.clone()
    }

    /// Feed one captured frame; returns the current rolling average.
    ///
    /// Latches `speech_observed` the first time the average crosses the
    /// threshold. The latch survives until `reset`.
    pub fn observe(&mut self, frame: &AudioFrame) -> f32 {
        self.window.push_back(frame.mean_amplitude());
        while self.window.len() > self.window_frames {
            self.window.pop_front();
        }

        let average = self.window.iter().sum::<f32>() / self.window.len() as f32;
        self.level.set(average);

        if average > self.threshold {
            self.speech_observed = true;
        }

        average
    }

    /// Whether speech was observed at least once since the last reset.
    pub fn speech_observed(&self) -> bool {
        self.speech_observed
    }

    /// Clear the latch and the rolling window for a new turn.
    pub fn reset(&mut self) {
        self.window.clear();
        self.speech_observed = false;
        self.level.set(0.0);
    }
}
