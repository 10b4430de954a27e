pub mod event;
pub mod availability;
pub mod booking;
pub mod repository;
pub mod events;

pub use event::{Event, EventType};
pub use availability::{Availability, Hold, Seat, SeatStatus, Selection, Slot};
pub use booking::{Booking, BookingStatus, FailureReason};
pub use repository::{BookingLedger, LedgerError};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("Duplicate booking id: {0}")]
    DuplicateId(Uuid),
}

pub type ReservationResult<T> = Result<T, ReservationError>;

impl From<LedgerError> for ReservationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateId(id) => ReservationError::DuplicateId(id),
            LedgerError::AlreadySuperseded(id) => {
                ReservationError::InvalidSelection(format!("booking {} is already closed", id))
            }
            LedgerError::Storage(msg) => ReservationError::PersistenceFailure(msg),
        }
    }
}
