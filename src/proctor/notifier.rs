use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::SessionEvent;

/// Schedule for the cosmetic "integrity check" notices.
///
/// These are operator-visible theatre only: they carry no state effect
/// and no detection logic. The schedule is explicit and deterministic
/// (fixed delay, fixed interval, round-robin messages) so tests can
/// mock it instead of fighting randomness.
#[derive(Debug, Clone)]
pub struct NoticeSchedule {
    /// Delay before the first notice
    pub initial_delay: Duration,
    /// Interval between subsequent notices
    pub interval: Duration,
    /// First notice shown after `initial_delay`
    pub opening_message: String,
    /// Rotation played after the opening notice, in order
    pub messages: Vec<String>,
}

impl Default for NoticeSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            interval: Duration::from_secs(45),
            opening_message: "Security check: validating candidate identity".to_string(),
            messages: vec![
                "System: monitoring snapshot captured".to_string(),
                "Gaze tracking: analyzing eye movement".to_string(),
                "Security: verifying environment integrity".to_string(),
                "System: periodic image scan complete".to_string(),
            ],
        }
    }
}

impl NoticeSchedule {
    /// Run the schedule until the event channel closes or the returned
    /// handle is aborted (the session aborts it on terminal transition).
    pub fn spawn(self, events: mpsc::UnboundedSender<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(self.initial_delay).await;
            if events
                .send(SessionEvent::IntegrityNotice {
                    message: self.opening_message.clone(),
                })
                .is_err()
            {
                return;
            }

            if self.messages.is_empty() {
                return;
            }

            let mut index = 0usize;
            loop {
                tokio::time::sleep(self.interval).await;
                let message = self.messages[index % self.messages.len()].clone();
                index += 1;
                if events
                    .send(SessionEvent::IntegrityNotice { message })
                    .is_err()
                {
                    return;
                }
            }
        })
    }
}
