use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wave_core::events::ChangeKind;
use wave_core::{Booking, BookingStatus, FailureReason, Selection};

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/users/{user_id}/bookings", get(list_user_bookings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub user_id: String,
    pub event_id: String,
    pub seats: Option<Vec<String>>,
    pub slot_id: Option<String>,
    pub hold_id: Option<Uuid>,
}

impl BookingRequest {
    fn selection(&self) -> Result<Selection, AppError> {
        match (&self.seats, &self.slot_id) {
            (Some(seats), None) => Ok(Selection::Seats(seats.clone())),
            (None, Some(slot_id)) => Ok(Selection::Slot(slot_id.clone())),
            _ => Err(AppError::ValidationError(
                "Provide exactly one of seats or slotId".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            status: booking.status,
            reason: booking.reason,
        }
    }
}

async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let selection = req.selection()?;

    let booking = match req.hold_id {
        Some(hold_id) => {
            state
                .coordinator
                .book_held(&req.user_id, &req.event_id, selection, hold_id)
                .await?
        }
        None => state.coordinator.book(&req.user_id, &req.event_id, selection).await?,
    };

    if booking.is_confirmed() {
        state.notify(
            &booking.event_id,
            ChangeKind::Booked,
            booking.selection.clone(),
            Some(booking.id),
        );
    }

    Ok(Json(BookingResponse::from(&booking)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub user_id: String,
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let cancellation = state.coordinator.cancel(&req.user_id, booking_id).await?;

    state.notify(
        &cancellation.event_id,
        ChangeKind::Released,
        cancellation.selection.clone(),
        Some(booking_id),
    );

    Ok(Json(BookingResponse::from(&cancellation)))
}

async fn list_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.coordinator.bookings_for_user(&user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seats: Option<Vec<String>>, slot_id: Option<String>) -> BookingRequest {
        BookingRequest {
            user_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            seats,
            slot_id,
            hold_id: None,
        }
    }

    #[test]
    fn test_selection_requires_exactly_one_shape() {
        assert!(matches!(
            request(Some(vec!["A1".into()]), None).selection(),
            Ok(Selection::Seats(_))
        ));
        assert!(matches!(
            request(None, Some("slot-evt-3-0".into())).selection(),
            Ok(Selection::Slot(_))
        ));
        assert!(request(None, None).selection().is_err());
        assert!(request(Some(vec!["A1".into()]), Some("slot-evt-3-0".into()))
            .selection()
            .is_err());
    }
}
