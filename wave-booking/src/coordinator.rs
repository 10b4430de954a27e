use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use wave_catalog::AvailabilityStore;
use wave_core::{
    Booking, BookingLedger, FailureReason, Hold, LedgerError, ReservationError, ReservationResult,
    Selection,
};

const DEFAULT_HOLD_SECONDS: i64 = 900;

/// Drives a booking request from validation to a recorded outcome.
///
/// The availability store is the only mutual-exclusion point: conflicting
/// requests are ordered by whichever commits its reservation first.
pub struct ReservationCoordinator {
    store: Arc<AvailabilityStore>,
    ledger: Arc<dyn BookingLedger>,
    hold_ttl: Duration,
}

impl ReservationCoordinator {
    pub fn new(store: Arc<AvailabilityStore>, ledger: Arc<dyn BookingLedger>) -> Self {
        Self {
            store,
            ledger,
            hold_ttl: Duration::seconds(DEFAULT_HOLD_SECONDS),
        }
    }

    pub fn with_hold_ttl(mut self, ttl: Duration) -> Self {
        self.hold_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<AvailabilityStore> {
        &self.store
    }

    /// Book seats or a slot.
    ///
    /// Taken seats or an exhausted slot are not an error: the attempt is
    /// recorded and returned as a FAILED booking with reason `Unavailable`.
    pub async fn book(&self, user_id: &str, event_id: &str, selection: Selection) -> ReservationResult<Booking> {
        self.submit(user_id, event_id, selection, None).await
    }

    /// Book seats previously held under `hold_id`
    pub async fn book_held(
        &self,
        user_id: &str,
        event_id: &str,
        selection: Selection,
        hold_id: Uuid,
    ) -> ReservationResult<Booking> {
        self.submit(user_id, event_id, selection, Some(hold_id)).await
    }

    async fn submit(
        &self,
        user_id: &str,
        event_id: &str,
        selection: Selection,
        hold: Option<Uuid>,
    ) -> ReservationResult<Booking> {
        if user_id.trim().is_empty() {
            return Err(ReservationError::InvalidSelection("missing user id".to_string()));
        }

        // 1. Shape check against the event type
        let event_type = self.store.event_type(event_id)?;
        selection.validate_for(event_type)?;

        let pending = Booking::pending(user_id, event_id, selection);

        // 2. Atomic reservation
        match self.store.try_reserve(event_id, &pending.selection, hold) {
            Ok(()) => {}
            Err(ReservationError::Unavailable(msg)) => {
                info!("Booking {} failed for {} on {}: {}", pending.id, user_id, event_id, msg);
                let failed = pending.fail(FailureReason::Unavailable);
                self.ledger.record(&failed).await?;
                return Ok(failed);
            }
            Err(e) => return Err(e),
        }

        // 3. Durable record, or roll the reservation back
        let confirmed = pending.confirm();
        if let Err(e) = self.ledger.record(&confirmed).await {
            error!("Ledger write failed for booking {}: {}, rolling back", confirmed.id, e);
            if let Err(release_err) = self.store.release(event_id, &confirmed.selection) {
                error!("Rollback of booking {} failed: {}", confirmed.id, release_err);
            }
            return Err(match e {
                LedgerError::DuplicateId(id) => ReservationError::DuplicateId(id),
                other => ReservationError::PersistenceFailure(other.to_string()),
            });
        }

        info!(
            "Booking confirmed: {} for {} on {} ({})",
            confirmed.id,
            user_id,
            event_id,
            confirmed.selection.describe()
        );
        Ok(confirmed)
    }

    /// Close a confirmed booking with a superseding CANCELLED record and give
    /// its seats or slot unit back.
    pub async fn cancel(&self, user_id: &str, booking_id: Uuid) -> ReservationResult<Booking> {
        let booking = self
            .ledger
            .get(booking_id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ReservationError::NotFound(format!("booking {}", booking_id)))?;

        if !booking.is_confirmed() {
            return Err(ReservationError::InvalidSelection(format!(
                "booking {} is {} and cannot be cancelled",
                booking_id,
                booking.status.as_str()
            )));
        }
        if self.ledger.superseded_by(booking_id).await?.is_some() {
            return Err(ReservationError::InvalidSelection(format!(
                "booking {} is already closed",
                booking_id
            )));
        }

        // Record first: the ledger rejects a second close of the same booking,
        // so only one caller ever reaches the release.
        let cancellation = booking.cancellation();
        self.ledger.record(&cancellation).await?;
        self.store.release(&booking.event_id, &booking.selection)?;

        info!("Booking cancelled: {} (closed by {})", booking_id, cancellation.id);
        Ok(cancellation)
    }

    /// Re-apply every active booking on the ledger to the store. Run once at
    /// startup, after events are registered and before traffic is served.
    ///
    /// Bookings whose event is gone or whose seats are already taken are
    /// logged and skipped. Returns the number restored.
    pub async fn restore(&self) -> ReservationResult<usize> {
        let active = self.ledger.active_bookings().await?;

        let mut restored = 0;
        for booking in &active {
            match self.store.try_reserve(&booking.event_id, &booking.selection, None) {
                Ok(()) => restored += 1,
                Err(e) => error!("Booking {} could not be restored: {}", booking.id, e),
            }
        }

        info!("Restored {} of {} active bookings", restored, active.len());
        Ok(restored)
    }

    /// Hold seats for the configured time-to-live
    pub fn hold(&self, event_id: &str, seats: &[String]) -> ReservationResult<Hold> {
        let expires_at = Utc::now()
            .checked_add_signed(self.hold_ttl)
            .ok_or_else(|| ReservationError::InvalidSelection("hold duration is out of range".to_string()))?;
        let hold = self.store.hold(event_id, seats, expires_at)?;
        info!("Hold {} placed on {} seats of {}", hold.hold_id, hold.seats.len(), event_id);
        Ok(hold)
    }

    pub fn release_hold(&self, event_id: &str, hold_id: Uuid) -> ReservationResult<Vec<String>> {
        let released = self.store.release_hold(event_id, hold_id)?;
        if released.is_empty() {
            warn!("Hold {} on {} had nothing left to release", hold_id, event_id);
            return Err(ReservationError::NotFound(format!("hold {}", hold_id)));
        }
        Ok(released)
    }

    pub async fn bookings_for_user(&self, user_id: &str) -> ReservationResult<Vec<Booking>> {
        Ok(self.ledger.list_for_user(user_id).await?)
    }
}
