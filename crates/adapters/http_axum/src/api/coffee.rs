//! Immediate brew command.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use brewhub_app::ports::{Actuator, Clock, EventPublisher};
use brewhub_domain::id::RunId;

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned once a brew has been started.
#[derive(Debug, Serialize)]
pub struct BrewStarted {
    pub run_id: RunId,
}

/// Possible responses from the brew endpoint.
pub enum StartResponse {
    Accepted(Json<BrewStarted>),
}

impl IntoResponse for StartResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /coffee`
///
/// Starts the brew sequence in the background and answers immediately.
pub async fn start<C, A, P>(
    State(state): State<AppState<C, A, P>>,
) -> Result<StartResponse, ApiError>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let run_id = state.sequencer.start()?;
    tracing::info!(%run_id, "immediate brew requested");
    Ok(StartResponse::Accepted(Json(BrewStarted { run_id })))
}
