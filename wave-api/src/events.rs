use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use wave_catalog::NewEvent;
use wave_core::{Availability, Event, EventType};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", get(list_events))
        .route("/v1/events/{id}", get(get_event))
        .route("/v1/events/{id}/availability", get(get_availability))
        .route("/v1/events/{id}/stream", get(stream_availability))
        .route("/v1/admin/events", post(create_event))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    event_type: Option<EventType>,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Event>> {
    Json(state.catalog.list(query.event_type))
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    state
        .catalog
        .get(&event_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Event {} not found", event_id)))
}

async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.catalog.publish(req).await?;
    info!("Admin created event {} ({})", event.id, event.event_type);
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_availability(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Availability>, AppError> {
    Ok(Json(state.coordinator.store().get_availability(&event_id)?))
}

/// Server-sent availability changes for one event
async fn stream_availability(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, AppError> {
    state.coordinator.store().event_type(&event_id)?;
    let rx = state.changes_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let event_id = event_id.clone();
        async move {
            match result {
                Ok(change) if change.event_id == event_id => SseEvent::default()
                    .event(change.change.as_str())
                    .json_data(&change)
                    .ok()
                    .map(Ok::<_, Infallible>),
                // Lagged receivers skip what they missed
                _ => None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
