use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use wave_catalog::CatalogError;
use wave_core::ReservationError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Request could not be stored, please retry".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ReservationError::InvalidSelection(_) => AppError::ValidationError(err.to_string()),
            ReservationError::Unavailable(_) => AppError::ConflictError(err.to_string()),
            ReservationError::PersistenceFailure(_) => AppError::ServiceUnavailable(err.to_string()),
            ReservationError::DuplicateId(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AlreadyExists(_) => AppError::ConflictError(err.to_string()),
            CatalogError::InvalidEvent(_) | CatalogError::InvalidSeatMap(_) => {
                AppError::ValidationError(err.to_string())
            }
            CatalogError::Storage(_) => AppError::ServiceUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_error_status_codes() {
        let cases = [
            (ReservationError::NotFound("event evt-9".into()), StatusCode::NOT_FOUND),
            (ReservationError::InvalidSelection("empty".into()), StatusCode::BAD_REQUEST),
            (ReservationError::Unavailable("A1".into()), StatusCode::CONFLICT),
            (ReservationError::PersistenceFailure("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ReservationError::DuplicateId(uuid::Uuid::new_v4()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
