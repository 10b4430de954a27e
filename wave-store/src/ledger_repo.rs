use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wave_core::{Booking, BookingLedger, BookingStatus, FailureReason, LedgerError, Selection};

const PRIMARY_KEY: &str = "bookings_pkey";
const SUPERSEDES_KEY: &str = "bookings_supersedes_key";

const SELECT_BOOKING: &str =
    "SELECT id, user_id, event_id, seats, slot_id, status, reason, supersedes, created_at FROM bookings";

/// Booking ledger on Postgres. Rows are only ever inserted.
pub struct PgBookingLedger {
    pool: PgPool,
}

impl PgBookingLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: String,
    event_id: String,
    seats: Option<Vec<String>>,
    slot_id: Option<String>,
    status: String,
    reason: Option<String>,
    supersedes: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = LedgerError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let selection = match (row.seats, row.slot_id) {
            (Some(seats), None) => Selection::Seats(seats),
            (None, Some(slot_id)) => Selection::Slot(slot_id),
            _ => return Err(LedgerError::Storage(format!("booking {} has no valid selection", row.id))),
        };
        let status = row.status.parse::<BookingStatus>().map_err(LedgerError::Storage)?;
        let reason = match row.reason.as_deref() {
            None => None,
            Some("Unavailable") => Some(FailureReason::Unavailable),
            Some(other) => return Err(LedgerError::Storage(format!("unknown failure reason {}", other))),
        };

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            selection,
            status,
            reason,
            supersedes: row.supersedes,
            created_at: row.created_at,
        })
    }
}

fn insert_error(err: sqlx::Error, booking: &Booking) -> LedgerError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match (db.constraint(), booking.supersedes) {
                (Some(PRIMARY_KEY), _) => return LedgerError::DuplicateId(booking.id),
                (Some(SUPERSEDES_KEY), Some(closed)) => return LedgerError::AlreadySuperseded(closed),
                _ => {}
            }
        }
    }
    LedgerError::Storage(err.to_string())
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn record(&self, booking: &Booking) -> Result<(), LedgerError> {
        let (seats, slot_id) = match &booking.selection {
            Selection::Seats(seats) => (Some(seats.clone()), None),
            Selection::Slot(slot_id) => (None, Some(slot_id.clone())),
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, event_id, seats, slot_id, status, reason, supersedes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.user_id)
        .bind(&booking.event_id)
        .bind(seats)
        .bind(slot_id)
        .bind(booking.status.as_str())
        .bind(booking.reason.map(|r| r.as_str()))
        .bind(booking.supersedes)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, booking))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, LedgerError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE id = $1", SELECT_BOOKING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, LedgerError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC, seq DESC",
            SELECT_BOOKING
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn superseded_by(&self, id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM bookings WHERE supersedes = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)
    }

    async fn active_bookings(&self) -> Result<Vec<Booking>, LedgerError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.user_id, b.event_id, b.seats, b.slot_id, b.status, b.reason, b.supersedes, b.created_at
            FROM bookings b
            WHERE b.status = 'CONFIRMED'
              AND NOT EXISTS (SELECT 1 FROM bookings c WHERE c.supersedes = b.id)
            ORDER BY b.seq
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> BookingRow {
        BookingRow {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            seats: Some(vec!["A1".to_string(), "A2".to_string()]),
            slot_id: None,
            status: "CONFIRMED".to_string(),
            reason: None,
            supersedes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_to_booking() {
        let booking = Booking::try_from(row()).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.selection, Selection::Seats(vec!["A1".to_string(), "A2".to_string()]));
    }

    #[test]
    fn test_failed_slot_row() {
        let mut r = row();
        r.seats = None;
        r.slot_id = Some("slot-evt-3-0".to_string());
        r.status = "FAILED".to_string();
        r.reason = Some("Unavailable".to_string());

        let booking = Booking::try_from(r).unwrap();
        assert_eq!(booking.reason, Some(FailureReason::Unavailable));
        assert_eq!(booking.selection, Selection::Slot("slot-evt-3-0".to_string()));
    }

    #[test]
    fn test_corrupt_rows_are_storage_errors() {
        let mut both = row();
        both.slot_id = Some("slot-1".to_string());
        assert!(matches!(Booking::try_from(both), Err(LedgerError::Storage(_))));

        let mut bad_status = row();
        bad_status.status = "REFUNDED".to_string();
        assert!(matches!(Booking::try_from(bad_status), Err(LedgerError::Storage(_))));
    }
}
