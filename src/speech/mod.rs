//! Serialized playback of interviewer utterances.
//!
//! Exactly one utterance plays at a time. A new `speak` preempts the
//! one in flight, waits for it to unwind, then starts. Playback errors
//! are logged and treated as silent completion so the conversation can
//! always proceed visually even when audio output fails.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::warn;

/// Speech synthesis backend trait
///
/// Wraps the host platform's text-to-speech. Dropping the `play` future
/// must stop playback; that is the cancellation mechanism.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Play one utterance to completion.
    ///
    /// `voice_hint` is best-effort: use the named voice if present,
    /// otherwise the platform default.
    async fn play(&self, text: &str, voice_hint: Option<&str>) -> Result<()>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// How an utterance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Playback ran to the end (or errored, which counts as done).
    Finished,
    /// A later utterance cancelled this one.
    Preempted,
}

pub struct SpeechOutput {
    backend: Arc<dyn SpeechBackend>,
    voice_hint: Option<String>,
    /// Wakes the in-flight utterance so it unwinds before the next starts.
    preempt: Notify,
    /// Serializes utterances; held for the duration of playback.
    playing: Mutex<()>,
}

impl SpeechOutput {
    pub fn new(backend: Arc<dyn SpeechBackend>, voice_hint: Option<String>) -> Self {
        Self {
            backend,
            voice_hint,
            preempt: Notify::new(),
            playing: Mutex::new(()),
        }
    }

    /// Cancel whatever is playing and speak `text`.
    ///
    /// Resolves when playback ends, errors, or is preempted by a later
    /// call. Never returns an error.
    pub async fn speak(&self, text: &str) -> SpeakOutcome {
        // Wake the current utterance, if any, then wait for our slot.
        // notify_waiters does not store a permit, so an idle output is
        // unaffected and our own wait below cannot be pre-triggered.
        self.preempt.notify_waiters();
        let _slot = self.playing.lock().await;

        tokio::select! {
            result = self.backend.play(text, self.voice_hint.as_deref()) => {
                if let Err(e) = result {
                    warn!(backend = self.backend.name(), "Speech playback failed: {e:#}");
                }
                SpeakOutcome::Finished
            }
            _ = self.preempt.notified() => SpeakOutcome::Preempted,
        }
    }
}
