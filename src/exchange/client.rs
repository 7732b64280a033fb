use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use super::messages::{TurnOutcome, TurnUpload};
use super::TurnExchange;
use crate::config::InterviewerConfig;
use crate::error::{SessionError, SessionResult};

/// HTTP implementation of the turn exchange.
///
/// Posts one `multipart/form-data` request per turn to
/// `{base_url}/interview/process` and decodes the JSON reply. Transport
/// failures map to `Network`, non-success statuses and unreadable bodies
/// to `Remote`; the session turns both into a retryable fallback line.
pub struct HttpTurnClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTurnClient {
    pub fn new(config: &InterviewerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/interview/process", config.base_url.trim_end_matches('/')),
        })
    }

    fn build_form(upload: &TurnUpload) -> SessionResult<reqwest::multipart::Form> {
        let audio_part = reqwest::multipart::Part::bytes(upload.artifact.bytes.clone())
            .file_name("input.wav")
            .mime_str(upload.artifact.mime_type)
            .map_err(|e| SessionError::Network(format!("invalid audio MIME: {e}")))?;

        Ok(reqwest::multipart::Form::new()
            .part("audio", audio_part)
            .text("candidate_email", upload.candidate_field().to_string())
            .text("job_title", upload.job_field().to_string())
            .text("history", upload.history.clone()))
    }
}

#[async_trait::async_trait]
impl TurnExchange for HttpTurnClient {
    async fn send(&self, upload: TurnUpload) -> SessionResult<TurnOutcome> {
        debug!(
            endpoint = %self.endpoint,
            audio_bytes = upload.artifact.bytes.len(),
            "Sending turn to interviewer service"
        );

        let form = Self::build_form(&upload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Remote(format!(
                "interviewer service returned {status}"
            )));
        }

        response
            .json::<TurnOutcome>()
            .await
            .map_err(|e| SessionError::Remote(format!("unreadable response body: {e}")))
    }
}
