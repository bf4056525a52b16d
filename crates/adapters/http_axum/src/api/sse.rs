//! Server-Sent Events (SSE) stream of brew and alarm events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use brewhub_app::ports::{Actuator, Clock, EventPublisher};

use crate::state::AppState;

/// `GET /events`: SSE stream of domain events.
///
/// Each event is sent as a JSON `data:` frame, tagged with its event type.
/// The stream continues until the client disconnects or the event bus is
/// closed.
pub async fn stream<C, A, P>(
    State(state): State<AppState<C, A, P>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default()
                .event(event.event_type.to_string())
                .data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
