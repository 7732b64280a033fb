use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::state::{
    SessionEvent, SessionState, SessionStats, Speaker, TranscriptEntry, ViolationRecord,
};
use crate::audio::{
    CaptureBackend, CaptureConfig, CaptureManager, LiveLevel, TurnArtifact, TurnRecorder,
    VideoFrame, VoiceActivityDetector,
};
use crate::error::{SessionError, SessionResult};
use crate::exchange::{TurnExchange, TurnUpload};
use crate::proctor::NoticeSchedule;
use crate::speech::{SpeechBackend, SpeechOutput};

/// Local feedback when the voice activity gate rejected a silent turn.
const NO_SPEECH_LINE: &str = "I didn't hear anything. Please speak closer to the mic.";
/// Fallback interviewer line when the turn exchange failed.
const EXCHANGE_TROUBLE_LINE: &str = "I'm having trouble hearing you. Please try again.";
/// Spoken when the watchdog terminates the session.
const TERMINATION_LINE: &str = "Interview terminated due to suspicious activity.";
/// Marker appended to the transcript context of the best-effort
/// disqualification report so the grading side records a fail.
const DISQUALIFIED_MARKER: &str =
    "SYSTEM: CANDIDATE DISQUALIFIED. REASON: CHEATING (TAB SWITCHING). TERMINATE IMMEDIATELY.";

/// The live interview session controller.
///
/// Owns the transcript, the violation record, and the capture devices,
/// and arbitrates every state transition. Concurrent activities (frame
/// capture, the watchdog, the integrity notifier, in-flight exchanges)
/// only *request* transitions through its methods; all mutation happens
/// under one lock, and every method re-checks the state after each
/// suspension point so a watchdog-forced disqualification preempts
/// whatever was in flight.
pub struct InterviewSession {
    config: SessionConfig,
    inner: Mutex<Inner>,
    exchange: Arc<dyn TurnExchange>,
    speech: Arc<SpeechOutput>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

struct Inner {
    state: SessionState,
    fullscreen: bool,
    transcript: Vec<TranscriptEntry>,
    violations: ViolationRecord,
    capture: CaptureManager,
    vad: Arc<StdMutex<VoiceActivityDetector>>,
    active_turn: Option<ActiveTurn>,
    notifier_task: Option<JoinHandle<()>>,
    started_at: DateTime<Utc>,
}

/// One recording attempt in flight: the capture task owns the frame
/// buffer and hands it back when told to stop.
struct ActiveTurn {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<TurnRecorder>,
}

impl InterviewSession {
    /// Build a session in `PreStart` with the interviewer greeting
    /// already seeded into the transcript.
    ///
    /// Returns the session and the event channel the embedding UI
    /// listens on.
    pub fn new(
        config: SessionConfig,
        capture_backend: Box<dyn CaptureBackend>,
        capture_config: CaptureConfig,
        speech_backend: Arc<dyn SpeechBackend>,
        exchange: Arc<dyn TurnExchange>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let vad = VoiceActivityDetector::new(config.vad_window_frames, config.vad_threshold);
        let speech = Arc::new(SpeechOutput::new(speech_backend, config.voice_hint.clone()));
        let greeting = TranscriptEntry::new(Speaker::Interviewer, config.greeting());

        let session = Arc::new(Self {
            config,
            inner: Mutex::new(Inner {
                state: SessionState::PreStart,
                fullscreen: false,
                transcript: vec![greeting],
                violations: ViolationRecord::default(),
                capture: CaptureManager::new(capture_backend, capture_config),
                vad: Arc::new(StdMutex::new(vad)),
                active_turn: None,
                notifier_task: None,
                started_at: Utc::now(),
            }),
            exchange,
            speech,
            events,
        });

        (session, events_rx)
    }

    /// Acquire devices and enter `Ready`, then speak the greeting.
    ///
    /// A device refusal surfaces as `DeviceDenied` and leaves the
    /// session in `PreStart` so the host can prompt and retry.
    pub async fn start(&self, notice_schedule: NoticeSchedule) -> SessionResult<()> {
        let greeting = {
            let mut inner = self.inner.lock().await;
            if inner.state != SessionState::PreStart {
                return Err(self.invalid(inner.state, "start session"));
            }

            inner.capture.acquire().await?;

            inner.notifier_task = Some(notice_schedule.spawn(self.events.clone()));
            inner.started_at = Utc::now();
            self.set_state(&mut inner, SessionState::Ready);
            info!(session = %self.config.session_id, "Interview session started");

            inner.transcript[0].text.clone()
        };

        self.speech.speak(&greeting).await;
        Ok(())
    }

    /// Begin one recording attempt.
    ///
    /// Legal only in `Ready` with fullscreen active; devices are reused
    /// from the cached handle (re-acquired only if unexpectedly lost).
    pub async fn begin_turn(&self) -> SessionResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.state != SessionState::Ready {
            return Err(self.invalid(inner.state, "start recording"));
        }
        if !inner.fullscreen {
            return Err(SessionError::InvalidState {
                state: "ready (fullscreen exited)".to_string(),
                action: "start recording".to_string(),
            });
        }

        // Fallback path: the cached handle is normally still live.
        inner.capture.acquire().await?;
        let mut frames = inner.capture.audio_frames()?;

        inner
            .vad
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reset();

        let vad = Arc::clone(&inner.vad);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut recorder = TurnRecorder::new();
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    frame = frames.recv() => match frame {
                        Ok(frame) => {
                            vad.lock().unwrap_or_else(|e| e.into_inner()).observe(&frame);
                            recorder.push(frame);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Recorder lagged behind capture");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            recorder
        });

        inner.active_turn = Some(ActiveTurn { stop_tx, task });
        self.set_state(&mut inner, SessionState::Recording);

        Ok(())
    }

    /// Stop the current recording and run the turn to completion:
    /// VAD gate, exchange, playback, and the resulting transition.
    ///
    /// Exactly one finish per begin; calling it in any other state is
    /// rejected here rather than inside the recorder.
    pub async fn finish_turn(&self) -> SessionResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.state != SessionState::Recording {
            return Err(self.invalid(inner.state, "stop recording"));
        }
        let Some(turn) = inner.active_turn.take() else {
            return Err(self.invalid(inner.state, "stop recording (no active turn)"));
        };

        let _ = turn.stop_tx.send(true);
        let recorder = match turn.task.await {
            Ok(recorder) => recorder,
            Err(e) => {
                error!("Capture task failed: {e}");
                TurnRecorder::new()
            }
        };

        let speech_observed = inner
            .vad
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .speech_observed();

        if !speech_observed || recorder.is_empty() {
            // Pure local round-trip: no upload for silent turns.
            info!("No speech detected locally, aborting upload");
            self.append(&mut inner, Speaker::Interviewer, NO_SPEECH_LINE);
            self.set_state(&mut inner, SessionState::Ready);
            drop(inner);
            self.speech.speak(NO_SPEECH_LINE).await;
            return Err(SessionError::NoSpeechDetected);
        }

        let artifact = recorder.finalize()?;
        let upload = TurnUpload {
            artifact,
            candidate_email: self.config.candidate_email.clone(),
            job_title: self.config.job_title.clone(),
            history: wire_history(&inner.transcript),
        };
        self.set_state(&mut inner, SessionState::AwaitingResponse);
        drop(inner);

        let outcome = self.exchange.send(upload).await;

        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() {
            // Accepted for logging only; never re-enters a live state.
            match &outcome {
                Ok(o) => info!(terminated = o.is_terminated, "Late turn response discarded"),
                Err(e) => info!("Late turn failure discarded: {e}"),
            }
            return Err(self.invalid(inner.state, "apply turn response"));
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Turn exchange failed: {e}");
                self.append(&mut inner, Speaker::Interviewer, EXCHANGE_TROUBLE_LINE);
                self.set_state(&mut inner, SessionState::Ready);
                return Err(e);
            }
        };

        if let Some(text) = &outcome.transcript {
            self.append(&mut inner, Speaker::Candidate, text);
        }
        if let Some(text) = &outcome.response {
            self.append(&mut inner, Speaker::Interviewer, text);
        }

        if let Some(response) = outcome.response.clone() {
            self.set_state(&mut inner, SessionState::Speaking);
            drop(inner);
            self.speech.speak(&response).await;
            inner = self.inner.lock().await;
            if inner.state.is_terminal() {
                return Ok(());
            }
        }

        if outcome.is_terminated {
            self.finish_locked(&mut inner).await;
        } else {
            self.set_state(&mut inner, SessionState::Ready);
        }

        Ok(())
    }

    /// Watchdog report: the interview tab/window lost visibility.
    ///
    /// Counts a strike while the session is live; at the configured
    /// limit the session is disqualified immediately. Reports after a
    /// terminal state have no effect.
    pub async fn report_hidden(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_terminal() || inner.state == SessionState::PreStart {
            return;
        }

        let count = inner.violations.record();
        if count >= self.config.violation_limit {
            warn!(count, "Violation limit reached, disqualifying");
            self.disqualify_locked(&mut inner).await;
        } else {
            warn!(count, limit = self.config.violation_limit, "Integrity strike");
            self.emit(SessionEvent::StrikeWarning {
                count,
                limit: self.config.violation_limit,
            });
        }
    }

    /// Watchdog report: fullscreen entered or exited.
    ///
    /// Exiting fullscreen blocks new turns but never disqualifies.
    pub async fn set_fullscreen(&self, active: bool) {
        let mut inner = self.inner.lock().await;
        if inner.fullscreen == active {
            return;
        }
        inner.fullscreen = active;
        self.emit(SessionEvent::FullscreenChanged { active });
    }

    /// Force the terminal `Disqualified` state, preempting any in-flight
    /// recording or exchange.
    async fn disqualify_locked(&self, inner: &mut Inner) {
        inner.violations.latch();

        if let Some(turn) = inner.active_turn.take() {
            let _ = turn.stop_tx.send(true);
            turn.task.abort();
        }
        if let Some(task) = inner.notifier_task.take() {
            task.abort();
        }

        self.set_state(inner, SessionState::Disqualified);
        inner.capture.release().await;

        // Best-effort report so grading records a fail. Disqualification
        // is already final on the client; this is fired once, off the
        // watchdog path, and its failure is only logged.
        let history = format!(
            "{}\n{}",
            wire_history(&inner.transcript),
            DISQUALIFIED_MARKER
        );
        let upload = TurnUpload {
            artifact: TurnArtifact::silent(16000, 250),
            candidate_email: self.config.candidate_email.clone(),
            job_title: self.config.job_title.clone(),
            history,
        };
        let exchange = Arc::clone(&self.exchange);
        let speech = Arc::clone(&self.speech);
        tokio::spawn(async move {
            let report = exchange.send(upload);
            let announcement = speech.speak(TERMINATION_LINE);
            let (report, _) = tokio::join!(report, announcement);
            if let Err(e) = report {
                error!("Failed to log disqualification: {e}");
            }
        });

        info!(session = %self.config.session_id, "Session disqualified");
    }

    /// Normal interviewer-signaled end of the session.
    async fn finish_locked(&self, inner: &mut Inner) {
        if let Some(task) = inner.notifier_task.take() {
            task.abort();
        }
        self.set_state(inner, SessionState::Finished);
        inner.capture.release().await;
        info!(session = %self.config.session_id, "Interview finished");
    }

    /// Current state snapshot.
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Copy of the conversation log so far.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.lock().await.transcript.clone()
    }

    /// Point-in-time snapshot for the embedding dashboard.
    pub async fn stats(&self) -> SessionStats {
        let inner = self.inner.lock().await;
        SessionStats {
            state: inner.state,
            started_at: inner.started_at,
            violation_count: inner.violations.count(),
            disqualified: inner.violations.is_disqualified(),
            transcript_len: inner.transcript.len(),
        }
    }

    /// Webcam feed for the proctoring preview.
    pub async fn video_preview(&self) -> SessionResult<broadcast::Receiver<VideoFrame>> {
        self.inner.lock().await.capture.video_frames()
    }

    /// Live microphone level for the host UI's visualizer.
    pub async fn input_level(&self) -> LiveLevel {
        let inner = self.inner.lock().await;
        let vad = inner.vad.lock().unwrap_or_else(|e| e.into_inner());
        vad.level()
    }

    fn set_state(&self, inner: &mut Inner, state: SessionState) {
        if inner.state == state {
            return;
        }
        inner.state = state;
        self.emit(SessionEvent::StateChanged { state });
    }

    fn append(&self, inner: &mut Inner, speaker: Speaker, text: &str) {
        debug_assert!(
            !inner.state.is_terminal(),
            "transcript is frozen after a terminal state"
        );
        let entry = TranscriptEntry::new(speaker, text);
        inner.transcript.push(entry.clone());
        self.emit(SessionEvent::TranscriptAppended { entry });
    }

    fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means the host stopped listening.
        let _ = self.events.send(event);
    }

    fn invalid(&self, state: SessionState, action: &str) -> SessionError {
        if state == SessionState::Disqualified {
            return SessionError::Disqualified(format!("cannot {action} after disqualification"));
        }
        SessionError::InvalidState {
            state: state.label().to_string(),
            action: action.to_string(),
        }
    }
}

/// Join the transcript into the plain-text context the interviewer
/// service expects: one `{SPEAKER}: {text}` line per entry.
fn wire_history(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .map(TranscriptEntry::wire_line)
        .collect::<Vec<_>>()
        .join("\n")
}
