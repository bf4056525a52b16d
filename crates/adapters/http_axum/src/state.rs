//! Shared application state for axum handlers.

use std::sync::Arc;

use brewhub_app::event_bus::InProcessEventBus;
use brewhub_app::ports::{Actuator, Clock, EventPublisher};
use brewhub_app::scheduler::AlarmScheduler;
use brewhub_app::sequencer::Sequencer;

/// Application state shared across all axum handlers.
///
/// Generic over the clock, actuator and event publisher to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`.
pub struct AppState<C, A, P> {
    /// The single daily alarm.
    pub scheduler: AlarmScheduler<C, A, P>,
    /// The brew sequencer, shared with the scheduler.
    pub sequencer: Arc<Sequencer<A, P>>,
    /// Event bus for the SSE stream.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<C, A, P> Clone for AppState<C, A, P> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            sequencer: Arc::clone(&self.sequencer),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<C, A, P> AppState<C, A, P>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state.
    ///
    /// `scheduler` must have been built around `sequencer` so that alarm
    /// brews and immediate brews share the same run-lock.
    pub fn new(
        scheduler: AlarmScheduler<C, A, P>,
        sequencer: Arc<Sequencer<A, P>>,
        event_bus: Arc<InProcessEventBus>,
    ) -> Self {
        Self {
            scheduler,
            sequencer,
            event_bus,
        }
    }
}
