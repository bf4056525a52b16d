//! HTTP handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod alarm;
#[allow(clippy::missing_errors_doc)]
pub mod coffee;
pub mod sse;
pub mod status;

use axum::Router;
use axum::routing::{get, post};

use brewhub_app::ports::{Actuator, Clock, EventPublisher};

use crate::state::AppState;

/// Build the command and status sub-router.
pub fn routes<C, A, P>() -> Router<AppState<C, A, P>>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/coffee", post(coffee::start::<C, A, P>))
        .route(
            "/alarm",
            get(alarm::get::<C, A, P>)
                .post(alarm::create::<C, A, P>)
                .patch(alarm::update::<C, A, P>)
                .delete(alarm::delete::<C, A, P>),
        )
        .route("/status", get(status::label::<C, A, P>))
        .route("/events", get(sse::stream::<C, A, P>))
}
