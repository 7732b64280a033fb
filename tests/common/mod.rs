// Deterministic fakes standing in for device capture, speech synthesis,
// and the interviewer service, so session behavior can be tested without
// hardware or a network.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use proctored_interview::{
    AudioFrame, CaptureBackend, CaptureConfig, InterviewSession, MediaStreams, NoticeSchedule,
    SessionConfig, SessionEvent, SessionResult, SpeechBackend, TurnExchange, TurnOutcome,
    TurnUpload,
};
use tokio::sync::mpsc;

/// Capture backend that emits a steady stream of frames at a fixed
/// amplitude (0 = a silent room).
pub struct ScriptedCapture {
    amplitude: i16,
    deny: bool,
    live: bool,
    pub acquires: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl ScriptedCapture {
    pub fn loud() -> Self {
        Self::with_amplitude(8000)
    }

    pub fn silent() -> Self {
        Self::with_amplitude(0)
    }

    pub fn denying() -> Self {
        let mut backend = Self::with_amplitude(0);
        backend.deny = true;
        backend
    }

    fn with_amplitude(amplitude: i16) -> Self {
        Self {
            amplitude,
            deny: false,
            live: false,
            acquires: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedCapture {
    async fn acquire(&mut self, config: &CaptureConfig) -> Result<MediaStreams> {
        if self.deny {
            anyhow::bail!("permission prompt dismissed");
        }
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.live = true;

        let (audio_tx, audio_rx) = mpsc::channel(64);
        let (_video_tx, video_rx) = mpsc::channel(4);
        let amplitude = self.amplitude;
        let sample_rate = config.sample_rate;

        tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            loop {
                let frame = AudioFrame {
                    samples: vec![amplitude; 320],
                    sample_rate,
                    channels: 1,
                    timestamp_ms,
                };
                if audio_tx.send(frame).await.is_err() {
                    break;
                }
                timestamp_ms += 20;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        Ok(MediaStreams {
            audio_rx,
            video_rx,
            device_label: "Test Microphone".to_string(),
        })
    }

    async fn release(&mut self) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.live = false;
        Ok(())
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn name(&self) -> &str {
        "scripted-capture"
    }
}

/// Speech backend that records what was spoken instead of playing it.
#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<String>>,
    pub playing: AtomicBool,
    pub delay: Duration,
}

impl RecordingSpeech {
    pub fn instant() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechBackend for RecordingSpeech {
    async fn play(&self, text: &str, _voice_hint: Option<&str>) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        if !self.delay.is_zero() {
            self.playing.store(true, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.playing.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording-speech"
    }
}

/// Scripted interviewer service: answers from a queue, falling back to
/// an empty outcome, and records every upload it saw.
#[derive(Default)]
pub struct ScriptedExchange {
    pub calls: AtomicUsize,
    pub uploads: Mutex<Vec<TurnUpload>>,
    pub script: Mutex<VecDeque<SessionResult<TurnOutcome>>>,
    pub delay: Duration,
}

impl ScriptedExchange {
    pub fn answering(outcomes: Vec<SessionResult<TurnOutcome>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn slow(delay: Duration, outcomes: Vec<SessionResult<TurnOutcome>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            delay,
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_history(&self) -> Option<String> {
        self.uploads.lock().unwrap().last().map(|u| u.history.clone())
    }
}

#[async_trait::async_trait]
impl TurnExchange for ScriptedExchange {
    async fn send(&self, upload: TurnUpload) -> SessionResult<TurnOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.uploads.lock().unwrap().push(upload);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TurnOutcome::default()))
    }
}

pub fn reply(transcript: &str, response: &str) -> SessionResult<TurnOutcome> {
    Ok(TurnOutcome {
        transcript: Some(transcript.to_string()),
        response: Some(response.to_string()),
        is_terminated: false,
    })
}

pub fn final_reply(transcript: &str, response: &str) -> SessionResult<TurnOutcome> {
    Ok(TurnOutcome {
        transcript: Some(transcript.to_string()),
        response: Some(response.to_string()),
        is_terminated: true,
    })
}

pub fn test_config() -> SessionConfig {
    SessionConfig {
        candidate_email: Some("candidate@example.com".to_string()),
        job_title: Some("Backend Engineer".to_string()),
        ..SessionConfig::default()
    }
}

/// Notice schedule far enough in the future to stay quiet during tests.
pub fn quiet_notices() -> NoticeSchedule {
    NoticeSchedule {
        initial_delay: Duration::from_secs(3600),
        ..NoticeSchedule::default()
    }
}

pub struct TestSession {
    pub session: Arc<InterviewSession>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub speech: Arc<RecordingSpeech>,
    pub exchange: Arc<ScriptedExchange>,
    pub acquires: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl TestSession {
    pub fn build(capture: ScriptedCapture, exchange: Arc<ScriptedExchange>) -> Self {
        Self::build_with_speech(capture, exchange, RecordingSpeech::instant())
    }

    pub fn build_with_speech(
        capture: ScriptedCapture,
        exchange: Arc<ScriptedExchange>,
        speech: Arc<RecordingSpeech>,
    ) -> Self {
        let acquires = capture.acquires.clone();
        let releases = capture.releases.clone();
        let (session, events) = InterviewSession::new(
            test_config(),
            Box::new(capture),
            CaptureConfig::default(),
            speech.clone(),
            exchange.clone(),
        );
        Self {
            session,
            events,
            speech,
            exchange,
            acquires,
            releases,
        }
    }

    /// Enter fullscreen and start: the normal path into `Ready`.
    pub async fn start(&self) {
        self.session.set_fullscreen(true).await;
        self.session
            .start(quiet_notices())
            .await
            .expect("session should start");
    }

    /// One full press-to-stop cycle with `capture_ms` of recording time.
    pub async fn run_turn(&self, capture_ms: u64) -> SessionResult<()> {
        self.session.begin_turn().await?;
        tokio::time::sleep(Duration::from_millis(capture_ms)).await;
        self.session.finish_turn().await
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}
