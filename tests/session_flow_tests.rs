// End-to-end turn lifecycle tests with scripted backends.

mod common;

use common::*;
use proctored_interview::{SessionError, SessionState, Speaker};
use std::time::Duration;

#[tokio::test]
async fn spoken_turn_makes_exactly_one_exchange_call() {
    let exchange = ScriptedExchange::answering(vec![reply(
        "I have five years of Rust experience",
        "Great, tell me about a project you led.",
    )]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    test.run_turn(60).await.expect("turn should complete");

    assert_eq!(test.exchange.call_count(), 1);
    assert_eq!(test.session.state().await, SessionState::Ready);

    let transcript = test.session.transcript().await;
    // Greeting, candidate line, interviewer line.
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].speaker, Speaker::Candidate);
    assert_eq!(transcript[2].speaker, Speaker::Interviewer);
}

#[tokio::test]
async fn silent_turn_never_reaches_the_network() {
    let exchange = ScriptedExchange::answering(vec![]);
    let test = TestSession::build(ScriptedCapture::silent(), exchange);
    test.start().await;

    let result = test.run_turn(60).await;

    assert!(matches!(result, Err(SessionError::NoSpeechDetected)));
    assert_eq!(test.exchange.call_count(), 0);
    assert_eq!(test.session.state().await, SessionState::Ready);

    // Local-only feedback line, appended and spoken.
    let transcript = test.session.transcript().await;
    let last = transcript.last().unwrap();
    assert_eq!(last.speaker, Speaker::Interviewer);
    assert!(last.text.contains("didn't hear anything"));
    assert!(test
        .speech
        .lines()
        .iter()
        .any(|line| line.contains("didn't hear anything")));
}

#[tokio::test]
async fn terminated_response_finishes_the_session_after_playback() {
    let exchange = ScriptedExchange::answering(vec![final_reply(
        "That is all from my side",
        "Thank you, the interview is complete.",
    )]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    test.run_turn(60).await.expect("final turn should complete");

    assert_eq!(test.session.state().await, SessionState::Finished);
    // The farewell was spoken before the terminal transition.
    assert!(test
        .speech
        .lines()
        .iter()
        .any(|line| line.contains("interview is complete")));

    // Terminal-state idempotence: no new recording can start.
    let result = test.session.begin_turn().await;
    assert!(matches!(result, Err(SessionError::InvalidState { .. })));
    assert_eq!(test.releases.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exchange_failure_keeps_the_session_retryable() {
    let exchange = ScriptedExchange::answering(vec![
        Err(SessionError::Network("connection refused".to_string())),
        reply("second attempt", "That came through, thanks."),
    ]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    let first = test.run_turn(60).await;
    assert!(matches!(first, Err(SessionError::Network(_))));
    assert_eq!(test.session.state().await, SessionState::Ready);

    let transcript = test.session.transcript().await;
    assert!(transcript
        .last()
        .unwrap()
        .text
        .contains("having trouble hearing you"));

    // Manual retry works; no automatic retry happened in between.
    test.run_turn(60).await.expect("retry should succeed");
    assert_eq!(test.exchange.call_count(), 2);
    assert_eq!(test.session.state().await, SessionState::Ready);
}

#[tokio::test]
async fn device_denial_blocks_the_session_start() {
    let exchange = ScriptedExchange::answering(vec![]);
    let test = TestSession::build(ScriptedCapture::denying(), exchange);
    test.session.set_fullscreen(true).await;

    let result = test.session.start(quiet_notices()).await;
    assert!(matches!(result, Err(SessionError::DeviceDenied(_))));
    assert_eq!(test.session.state().await, SessionState::PreStart);

    // No devices were ever held, so nothing to release.
    let result = test.session.begin_turn().await;
    assert!(matches!(result, Err(SessionError::InvalidState { .. })));
}

#[tokio::test]
async fn at_most_one_turn_in_flight() {
    let exchange = ScriptedExchange::answering(vec![]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    test.session.begin_turn().await.expect("first begin");
    // Starting again while recording is rejected, not queued.
    let second = test.session.begin_turn().await;
    assert!(matches!(second, Err(SessionError::InvalidState { .. })));

    // Stopping without an active recording is rejected too.
    tokio::time::sleep(Duration::from_millis(40)).await;
    test.session.finish_turn().await.ok();
    let stray_stop = test.session.finish_turn().await;
    assert!(matches!(stray_stop, Err(SessionError::InvalidState { .. })));
}

#[tokio::test]
async fn transcript_grows_monotonically_and_in_order() {
    let exchange = ScriptedExchange::answering(vec![
        reply("first answer", "first question back"),
        reply("second answer", "second question back"),
    ]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    let mut last_len = test.session.transcript().await.len();
    for _ in 0..2 {
        test.run_turn(60).await.expect("turn should complete");
        let transcript = test.session.transcript().await;
        assert!(transcript.len() > last_len, "transcript must only grow");
        last_len = transcript.len();
    }

    let transcript = test.session.transcript().await;
    let texts: Vec<&str> = transcript.iter().map(|e| e.text.as_str()).collect();
    let first_answer = texts.iter().position(|t| *t == "first answer").unwrap();
    let first_question = texts
        .iter()
        .position(|t| *t == "first question back")
        .unwrap();
    let second_answer = texts.iter().position(|t| *t == "second answer").unwrap();
    // Candidate line lands before the interviewer line answering it.
    assert!(first_answer < first_question);
    assert!(first_question < second_answer);
}

#[tokio::test]
async fn history_uses_wire_labels_and_defaults() {
    let exchange = ScriptedExchange::answering(vec![reply("noted", "go on")]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    test.run_turn(60).await.expect("turn should complete");

    let history = test.exchange.last_history().expect("one upload recorded");
    // The greeting is the only line at the time of the first upload.
    assert!(history.starts_with("AI: Hello!"));
    assert!(!history.contains('\n'), "single entry, no joiner yet");

    let uploads = test.exchange.uploads.lock().unwrap();
    let upload = uploads.last().unwrap();
    assert_eq!(upload.candidate_field(), "candidate@example.com");
    assert_eq!(upload.job_field(), "Backend Engineer");
    assert_eq!(&upload.artifact.bytes[0..4], b"RIFF");
}

#[tokio::test]
async fn greeting_is_seeded_and_spoken_on_start() {
    let exchange = ScriptedExchange::answering(vec![]);
    let test = TestSession::build(ScriptedCapture::loud(), exchange);
    test.start().await;

    let transcript = test.session.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].speaker, Speaker::Interviewer);
    assert!(transcript[0].text.contains("Backend Engineer"));

    let spoken = test.speech.lines();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].contains("Backend Engineer"));
}
