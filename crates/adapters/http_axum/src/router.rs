//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use brewhub_app::ports::{Actuator, Clock, EventPublisher};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<C, A, P>(state: AppState<C, A, P>) -> Router
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
