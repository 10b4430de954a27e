use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::Booking;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking id already recorded: {0}")]
    DuplicateId(Uuid),
    #[error("Booking already superseded: {0}")]
    AlreadySuperseded(Uuid),
    #[error("Ledger storage error: {0}")]
    Storage(String),
}

/// Append-only record of booking outcomes; the durability boundary for
/// "booking succeeded".
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Append an immutable record keyed by booking id.
    ///
    /// Fails with `DuplicateId` if the id exists and with `AlreadySuperseded`
    /// if `booking.supersedes` names a record that is already closed.
    async fn record(&self, booking: &Booking) -> Result<(), LedgerError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, LedgerError>;

    /// All records of a user, most recent first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, LedgerError>;

    /// Id of the record that closed `id`, if any
    async fn superseded_by(&self, id: Uuid) -> Result<Option<Uuid>, LedgerError>;

    /// CONFIRMED records that nothing has superseded, oldest first. These are
    /// the bookings still holding seats or slot capacity.
    async fn active_bookings(&self) -> Result<Vec<Booking>, LedgerError>;
}
