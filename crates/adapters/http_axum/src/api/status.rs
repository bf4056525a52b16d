//! Plain-text status display.

use axum::extract::State;

use brewhub_app::ports::{Actuator, Clock, EventPublisher};

use crate::state::AppState;

/// `GET /status`: `--:--`, `HH:MM` or `in progress`.
pub async fn label<C, A, P>(State(state): State<AppState<C, A, P>>) -> String
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    state.scheduler.state().display_label()
}
