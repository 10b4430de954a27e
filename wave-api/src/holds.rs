use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wave_core::events::ChangeKind;
use wave_core::{Hold, Selection};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(create_hold))
        .route("/v1/holds/{event_id}/{hold_id}", delete(release_hold))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRequest {
    pub event_id: String,
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub released: Vec<String>,
}

async fn create_hold(
    State(state): State<AppState>,
    Json(req): Json<HoldRequest>,
) -> Result<(StatusCode, Json<Hold>), AppError> {
    let hold = state.coordinator.hold(&req.event_id, &req.seats)?;

    state.notify(
        &hold.event_id,
        ChangeKind::Held,
        Selection::Seats(hold.seats.clone()),
        None,
    );

    Ok((StatusCode::CREATED, Json(hold)))
}

async fn release_hold(
    State(state): State<AppState>,
    Path((event_id, hold_id)): Path<(String, Uuid)>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let released = state.coordinator.release_hold(&event_id, hold_id)?;

    state.notify(&event_id, ChangeKind::Released, Selection::Seats(released.clone()), None);

    Ok(Json(ReleaseResponse { released }))
}
