//! Actuator sequencer: replays the brew [`Sequence`] exclusively.
//!
//! Immediate brews and alarm-triggered brews share the same buttons, so a
//! single run-permit guards the hardware: a second request while a run is in
//! progress is rejected with [`BrewError::SequencerBusy`], never queued and
//! never interleaved. Once started, a run always executes every step.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use brewhub_domain::actuator::Sequence;
use brewhub_domain::error::BrewError;
use brewhub_domain::event::{Event, EventType};
use brewhub_domain::id::RunId;

use crate::ports::{Actuator, EventPublisher};

/// Exclusive right to drive the actuators, obtained from
/// [`Sequencer::try_acquire`]. Released when dropped.
#[derive(Debug)]
pub struct RunPermit {
    run_id: RunId,
    _permit: OwnedSemaphorePermit,
}

impl RunPermit {
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }
}

/// Outcome of one complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    /// Number of steps executed (always the full sequence).
    pub steps_executed: usize,
    /// Indexes of steps whose actuator command failed.
    pub failed_steps: Vec<usize>,
}

impl RunReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// Runs the configured [`Sequence`] against an [`Actuator`].
pub struct Sequencer<A, P> {
    sequence: Sequence,
    actuator: A,
    publisher: P,
    run_lock: Arc<Semaphore>,
}

impl<A, P> Sequencer<A, P>
where
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a sequencer for `sequence`.
    pub fn new(sequence: Sequence, actuator: A, publisher: P) -> Self {
        Self {
            sequence,
            actuator,
            publisher,
            run_lock: Arc::new(Semaphore::new(1)),
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub(crate) fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Whether a run currently holds the actuators.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_lock.available_permits() == 0
    }

    /// Wait until no run holds the actuators.
    ///
    /// Returns immediately when idle. Used on shutdown so a run in progress
    /// is never cut off between a press and its release.
    pub async fn wait_idle(&self) {
        // the run-lock is never closed
        let _idle = self.run_lock.acquire().await;
    }

    /// Take the run-permit without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::SequencerBusy`] while another run is in progress.
    pub fn try_acquire(&self) -> Result<RunPermit, BrewError> {
        let permit = Arc::clone(&self.run_lock)
            .try_acquire_owned()
            .map_err(|_| BrewError::SequencerBusy)?;
        Ok(RunPermit {
            run_id: RunId::new(),
            _permit: permit,
        })
    }

    /// Execute every step in order, holding `permit` until the last hold
    /// elapses.
    ///
    /// A failing actuator command is logged and recorded in the report; the
    /// remaining steps still run so no button is left pressed.
    pub async fn run(&self, permit: RunPermit) -> RunReport {
        let run_id = permit.run_id;
        let total_secs = self.sequence.total_duration().as_secs();
        tracing::info!(%run_id, steps = self.sequence.len(), total_secs, "brew started");
        let _ = self
            .publisher
            .publish(Event::new(
                EventType::BrewStarted,
                serde_json::json!({ "run_id": run_id, "total_secs": total_secs }),
            ))
            .await;

        let mut failed_steps = Vec::new();
        for (index, step) in self.sequence.steps().iter().enumerate() {
            tracing::debug!(%run_id, step = index, actuator = %step.actuator, level = %step.level, "actuator step");
            if let Err(err) = self.actuator.set(&step.actuator, step.level).await {
                tracing::warn!(%run_id, step = index, actuator = %step.actuator, %err, "actuator command failed, continuing sequence");
                failed_steps.push(index);
            }
            tokio::time::sleep(step.hold()).await;
            let _ = self
                .publisher
                .publish(Event::new(
                    EventType::BrewStepCompleted,
                    serde_json::json!({
                        "run_id": run_id,
                        "step": index,
                        "actuator": step.actuator,
                        "level": step.level,
                    }),
                ))
                .await;
        }

        let report = RunReport {
            run_id,
            steps_executed: self.sequence.len(),
            failed_steps,
        };
        tracing::info!(%run_id, failed = report.failed_steps.len(), "brew finished");
        let _ = self
            .publisher
            .publish(Event::new(
                EventType::BrewFinished,
                serde_json::json!({ "run_id": run_id, "failed_steps": report.failed_steps }),
            ))
            .await;

        drop(permit);
        report
    }

    /// Acquire the permit and run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::SequencerBusy`] while another run is in progress.
    pub async fn run_exclusive(&self) -> Result<RunReport, BrewError> {
        let permit = self.try_acquire()?;
        Ok(self.run(permit).await)
    }

    /// Acquire the permit synchronously and run in a background task.
    ///
    /// Returns as soon as the run is started so callers never block on the
    /// full brew duration.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::SequencerBusy`] while another run is in progress.
    pub fn start(self: &Arc<Self>) -> Result<RunId, BrewError> {
        let permit = self.try_acquire()?;
        let run_id = permit.run_id();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run(permit).await;
        });
        Ok(run_id)
    }
}
