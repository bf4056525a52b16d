//! Alarm scheduler: owns the single daily alarm and fires the sequencer.
//!
//! The alarm never arms one absolute timer. Its wait loop re-reads the
//! [`Clock`] on every iteration and sleeps half of the remaining time until
//! the last minute, which it waits exactly (see
//! [`next_wait`](brewhub_domain::time::next_wait)). A clock stepped forward or
//! back by an external synchronization is therefore corrected within one
//! iteration.
//!
//! The alarm state and the scheduled-task slot live behind one mutex.
//! `schedule`, `cancel` and `reschedule` are atomic test-and-set operations
//! on the status, and each spawned wait loop carries a generation number
//! that it re-validates under the same lock before firing. A cancelled or
//! superseded loop can therefore never fire, even if its sleep completes at
//! the same instant the cancellation lands.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use brewhub_domain::alarm::{AlarmState, AlarmStatus};
use brewhub_domain::error::BrewError;
use brewhub_domain::event::{Event, EventType};
use brewhub_domain::time::{AlarmTime, WaitStep, next_wait, seconds_until};

use crate::ports::{Actuator, Clock, EventPublisher};
use crate::sequencer::{RunPermit, Sequencer};

/// Tuning knobs for the wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// First delay after a failed clock read.
    pub retry_initial: Duration,
    /// Upper bound for the doubling clock-read backoff.
    pub retry_max: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            retry_initial: Duration::from_secs(1),
            retry_max: Duration::from_secs(30),
        }
    }
}

/// The pending wait loop. Dropping it signals cancellation.
struct ScheduledTask {
    generation: u64,
    signal: watch::Sender<bool>,
}

impl ScheduledTask {
    fn cancel(self) {
        self.signal.send_replace(true);
    }
}

/// An armed wait loop that has not been spawned yet.
struct WaitLoop {
    generation: u64,
    target: AlarmTime,
    cancelled: watch::Receiver<bool>,
}

struct Slot {
    state: AlarmState,
    task: Option<ScheduledTask>,
    next_generation: u64,
}

impl Slot {
    fn is_current(&self, generation: u64) -> bool {
        self.state.status == AlarmStatus::Scheduled
            && self
                .task
                .as_ref()
                .is_some_and(|task| task.generation == generation)
    }

    fn transition(&mut self, next: AlarmState) {
        debug_assert!(
            self.state.status.can_transition_to(next.status),
            "illegal alarm transition {} -> {}",
            self.state.status,
            next.status
        );
        self.state = next;
    }
}

struct Inner<C, A, P> {
    clock: C,
    sequencer: Arc<Sequencer<A, P>>,
    config: SchedulerConfig,
    slot: Mutex<Slot>,
}

enum FireDecision {
    Stale,
    Run(RunPermit),
    Busy,
}

/// Owns the one process-wide alarm.
///
/// Cloning is cheap and every clone controls the same alarm.
pub struct AlarmScheduler<C, A, P> {
    inner: Arc<Inner<C, A, P>>,
}

impl<C, A, P> Clone for AlarmScheduler<C, A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, A, P> AlarmScheduler<C, A, P>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create an idle scheduler firing `sequencer`.
    pub fn new(clock: C, sequencer: Arc<Sequencer<A, P>>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                sequencer,
                config,
                slot: Mutex::new(Slot {
                    state: AlarmState::idle(),
                    task: None,
                    next_generation: 0,
                }),
            }),
        }
    }

    /// Current alarm snapshot.
    #[must_use]
    pub fn state(&self) -> AlarmState {
        self.inner.lock_slot().state
    }

    /// Arm the alarm for the next occurrence of `at`.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::AlreadyScheduled`] unless the alarm is idle.
    pub async fn schedule(&self, at: AlarmTime) -> Result<AlarmState, BrewError> {
        let (state, wait) = {
            let mut slot = self.inner.lock_slot();
            if slot.state.status != AlarmStatus::Idle {
                return Err(BrewError::AlreadyScheduled);
            }
            Self::arm(&mut slot, at)
        };
        tracing::info!(%at, "alarm scheduled");
        self.inner.publish_alarm(EventType::AlarmScheduled, at).await;
        self.spawn(wait);
        Ok(state)
    }

    /// Disarm the pending alarm.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::NothingScheduled`] unless the alarm is scheduled;
    /// a running brew is never interrupted.
    pub async fn cancel(&self) -> Result<AlarmState, BrewError> {
        let (state, target) = {
            let mut slot = self.inner.lock_slot();
            let target = Self::disarm(&mut slot)?;
            (slot.state, target)
        };
        tracing::info!(%target, "alarm cancelled");
        self.inner
            .publish_alarm(EventType::AlarmCancelled, target)
            .await;
        Ok(state)
    }

    /// Replace the pending alarm (if any) with `at`, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::AlreadyScheduled`] while the alarm-triggered brew
    /// is running.
    pub async fn reschedule(&self, at: AlarmTime) -> Result<AlarmState, BrewError> {
        let (state, wait, previous) = {
            let mut slot = self.inner.lock_slot();
            let previous = match Self::disarm(&mut slot) {
                Ok(previous) => Some(previous),
                Err(BrewError::NothingScheduled) if slot.state.status == AlarmStatus::Idle => None,
                Err(_) => return Err(BrewError::AlreadyScheduled),
            };
            let (state, wait) = Self::arm(&mut slot, at);
            (state, wait, previous)
        };
        if let Some(previous) = previous {
            tracing::info!(%previous, "alarm cancelled");
            self.inner
                .publish_alarm(EventType::AlarmCancelled, previous)
                .await;
        }
        tracing::info!(%at, "alarm scheduled");
        self.inner.publish_alarm(EventType::AlarmScheduled, at).await;
        self.spawn(wait);
        Ok(state)
    }

    /// Stop taking alarms and wait for the actuators to come to rest.
    ///
    /// A pending alarm is disarmed. A brew that already started, immediate
    /// or alarm-triggered, runs to its last step before this returns.
    pub async fn shutdown(&self) {
        if self.cancel().await.is_ok() {
            tracing::info!("pending alarm disarmed for shutdown");
        }
        if self.inner.sequencer.is_running() {
            tracing::info!("waiting for the running brew to finish");
        }
        self.inner.sequencer.wait_idle().await;
    }

    /// Install a fresh task in an idle slot. The wait loop is started by
    /// [`Self::spawn`] once `AlarmScheduled` is out.
    fn arm(slot: &mut Slot, at: AlarmTime) -> (AlarmState, WaitLoop) {
        let generation = slot.next_generation;
        slot.next_generation += 1;

        let (signal, cancelled) = watch::channel(false);
        slot.task = Some(ScheduledTask { generation, signal });
        slot.transition(AlarmState::scheduled(at));

        let wait = WaitLoop {
            generation,
            target: at,
            cancelled,
        };
        (slot.state, wait)
    }

    /// Start an armed wait loop. A loop disarmed in the meantime exits on
    /// its first iteration.
    fn spawn(&self, wait: WaitLoop) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.wait_and_fire(wait.generation, wait.target, wait.cancelled));
    }

    /// Cancel the pending task, returning its target.
    fn disarm(slot: &mut Slot) -> Result<AlarmTime, BrewError> {
        if slot.state.status != AlarmStatus::Scheduled {
            return Err(BrewError::NothingScheduled);
        }
        let target = slot.state.target.ok_or(BrewError::NothingScheduled)?;
        if let Some(task) = slot.task.take() {
            task.cancel();
        }
        slot.transition(AlarmState::idle());
        Ok(target)
    }
}

impl<C, A, P> Inner<C, A, P>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn publish_alarm(&self, event_type: EventType, at: AlarmTime) {
        let event = Event::new(
            event_type,
            serde_json::json!({ "hour": at.hour(), "minute": at.minute() }),
        );
        let _ = self.sequencer.publisher().publish(event).await;
    }

    /// The body of a scheduled task.
    async fn wait_and_fire(
        self: Arc<Self>,
        generation: u64,
        target: AlarmTime,
        mut cancelled: watch::Receiver<bool>,
    ) {
        let mut backoff = self.config.retry_initial;
        loop {
            if *cancelled.borrow() || !self.lock_slot().is_current(generation) {
                tracing::debug!(generation, "alarm wait loop cancelled");
                return;
            }

            let now = match self.clock.now() {
                Ok(now) => {
                    backoff = self.config.retry_initial;
                    now
                }
                Err(err) => {
                    tracing::warn!(
                        %err,
                        retry_in_secs = backoff.as_secs_f64(),
                        "clock read failed, alarm kept pending"
                    );
                    if !sleep_unless_cancelled(backoff, &mut cancelled).await {
                        return;
                    }
                    backoff = (backoff * 2).min(self.config.retry_max);
                    continue;
                }
            };

            let delta_secs = seconds_until(now, target);
            let step = next_wait(delta_secs);
            tracing::debug!(%now, %target, delta_secs, ?step, "alarm waiting");
            if !sleep_unless_cancelled(step.duration(), &mut cancelled).await {
                tracing::debug!(generation, "alarm wait loop cancelled");
                return;
            }
            if matches!(step, WaitStep::Final(_)) {
                break;
            }
        }

        self.fire(generation, target).await;
    }

    async fn fire(&self, generation: u64, target: AlarmTime) {
        let decision = {
            let mut slot = self.lock_slot();
            if slot.is_current(generation) {
                slot.task = None;
                match self.sequencer.try_acquire() {
                    Ok(permit) => {
                        slot.transition(AlarmState::running(target));
                        FireDecision::Run(permit)
                    }
                    Err(_) => {
                        slot.transition(AlarmState::idle());
                        FireDecision::Busy
                    }
                }
            } else {
                FireDecision::Stale
            }
        };

        match decision {
            FireDecision::Stale => {
                tracing::debug!(generation, "superseded alarm did not fire");
            }
            FireDecision::Busy => {
                tracing::warn!(%target, "alarm fired while a brew was running, skipped");
                self.publish_alarm(EventType::AlarmSkipped, target).await;
            }
            FireDecision::Run(permit) => {
                tracing::info!(%target, run_id = %permit.run_id(), "alarm fired");
                self.publish_alarm(EventType::AlarmFired, target).await;
                let report = self.sequencer.run(permit).await;
                if !report.is_clean() {
                    tracing::warn!(run_id = %report.run_id, failed_steps = ?report.failed_steps, "alarm brew finished with actuator failures");
                }
                self.lock_slot().transition(AlarmState::idle());
            }
        }
    }
}

/// Sleep for `duration`. Returns `false` if cancellation arrived first.
async fn sleep_unless_cancelled(duration: Duration, cancelled: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        _ = cancelled.wait_for(|cancelled| *cancelled) => false,
    }
}
