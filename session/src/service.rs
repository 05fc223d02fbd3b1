//! Async shell around the liveness evaluator.
//!
//! The evaluator itself is synchronous and pure; this loop feeds it frames
//! from a channel, wakes it when a challenge deadline passes, runs the
//! requested photo capture off-loop, and publishes every state change on a
//! watch channel for the UI.

use std::sync::Arc;
use std::time::Duration;

use idgate_liveness::{
    CaptureOutcome, ChallengeStep, Command, Evaluator, LivenessSession, LivenessStatus,
};
use idgate_types::{Clock, FrameReport, Viewport};
use tokio::sync::{broadcast, mpsc, watch};

use crate::metrics::EngineMetrics;
use crate::services::PhotoCapture;

/// Wake interval while no challenge deadline is armed.
const IDLE_WAKE_MS: u64 = 60_000;

/// Drives one verification attempt to completion.
pub struct LivenessService<C> {
    evaluator: Evaluator,
    session: LivenessSession,
    capture: Arc<C>,
    clock: Arc<dyn Clock>,
    status_tx: watch::Sender<LivenessStatus>,
    metrics: Arc<EngineMetrics>,
    last_generation: u64,
}

impl<C: PhotoCapture + 'static> LivenessService<C> {
    /// Builds the service and the status channel its consumers watch.
    pub fn new(
        evaluator: Evaluator,
        viewport: Viewport,
        capture: Arc<C>,
        clock: Arc<dyn Clock>,
        metrics: Arc<EngineMetrics>,
    ) -> (Self, watch::Receiver<LivenessStatus>) {
        let session = LivenessSession::new(viewport);
        let (status_tx, status_rx) = watch::channel(session.status());
        let service = LivenessService {
            evaluator,
            session,
            capture,
            clock,
            status_tx,
            metrics,
            last_generation: 0,
        };
        (service, status_rx)
    }

    /// Runs until the attempt reaches a terminal step, the frame source
    /// closes, or shutdown is signalled. Returns the final status.
    ///
    /// Frames are evaluated at their producer timestamps. The sleep arm
    /// exists for the gaps: when no frame arrives, the earliest armed
    /// deadline still has to fire on time.
    pub async fn run(
        mut self,
        mut frames: mpsc::Receiver<FrameReport>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> LivenessStatus {
        let (capture_tx, mut capture_rx) = mpsc::channel::<(u64, CaptureOutcome)>(1);

        loop {
            let wake = Duration::from_millis(match self.session.next_deadline() {
                Some(deadline) => deadline.millis_until(self.clock.now()),
                None => IDLE_WAKE_MS,
            });

            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("liveness service shutting down");
                    break;
                }

                Some((generation, outcome)) = capture_rx.recv() => {
                    self.evaluator
                        .finish_capture(&mut self.session, generation, outcome);
                    self.publish();
                }

                report = frames.recv() => {
                    let Some(report) = report else {
                        tracing::debug!("frame source closed");
                        break;
                    };
                    self.metrics.frames_evaluated.inc();
                    let command =
                        self.evaluator
                            .observe(&mut self.session, &report.faces, report.at);
                    if let Some(command) = command {
                        self.dispatch(command, &capture_tx);
                    }
                    self.publish();
                }

                _ = tokio::time::sleep(wake) => {
                    self.evaluator.expire(&mut self.session, self.clock.now());
                    self.publish();
                }
            }

            if self.session.step.is_terminal() {
                break;
            }
        }

        match self.session.step {
            ChallengeStep::Done => self.metrics.sessions_completed.inc(),
            ChallengeStep::Failed => self.metrics.sessions_failed.inc(),
            _ => {}
        }
        self.session.status()
    }

    fn dispatch(&self, command: Command, results: &mpsc::Sender<(u64, CaptureOutcome)>) {
        match command {
            Command::RequestPhoto { generation } => {
                tracing::debug!(generation, "requesting final photo");
                let capture = Arc::clone(&self.capture);
                let results = results.clone();
                tokio::spawn(async move {
                    let outcome = match capture.take_photo().await {
                        Ok(photo) => CaptureOutcome::Captured(photo),
                        Err(error) => {
                            tracing::warn!(%error, "photo capture failed");
                            CaptureOutcome::Failed(error.to_string())
                        }
                    };
                    // The loop may have exited; a dropped receiver is fine.
                    let _ = results.send((generation, outcome)).await;
                });
            }
        }
    }

    fn publish(&mut self) {
        let resets = self.session.generation - self.last_generation;
        if resets > 0 {
            self.last_generation = self.session.generation;
            self.metrics.session_resets.inc_by(resets);
            tracing::debug!(generation = self.session.generation, "attempt reset");
        }
        let next = self.session.status();
        self.status_tx.send_if_modified(|status| {
            if *status == next {
                false
            } else {
                *status = next.clone();
                true
            }
        });
    }
}
