use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::InterviewSession;

/// External integrity signals observed by the host page/window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProctorSignal {
    /// The interview tab/window lost visibility
    TabHidden,
    /// The interview tab/window became visible again
    TabVisible,
    FullscreenEntered,
    FullscreenExited,
}

/// Always-on monitor translating visibility/fullscreen transitions into
/// session transition requests.
///
/// The watchdog never mutates session state itself; it only reports.
/// The controller arbitrates: tab-hidden strikes count toward
/// disqualification, fullscreen exit merely blocks new turns until
/// fullscreen is re-entered.
pub struct Watchdog;

impl Watchdog {
    /// Observe `signals` for the life of the stream.
    ///
    /// Signals arriving after the session reached a terminal state are
    /// ignored by the controller, so the loop simply runs until the
    /// host drops its end of the stream.
    pub fn spawn<S>(session: Arc<InterviewSession>, signals: S) -> JoinHandle<()>
    where
        S: Stream<Item = ProctorSignal> + Send + Unpin + 'static,
    {
        tokio::spawn(async move {
            let mut signals = signals;
            while let Some(signal) = signals.next().await {
                debug!(?signal, "Proctor signal");
                match signal {
                    ProctorSignal::TabHidden => session.report_hidden().await,
                    ProctorSignal::TabVisible => {}
                    ProctorSignal::FullscreenEntered => session.set_fullscreen(true).await,
                    ProctorSignal::FullscreenExited => session.set_fullscreen(false).await,
                }
            }
            debug!("Proctor signal stream ended");
        })
    }
}
