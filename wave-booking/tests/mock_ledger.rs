use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use wave_booking::InMemoryLedger;
use wave_core::{Booking, BookingLedger, LedgerError};

/// Ledger whose writes can be switched to fail, for rollback tests
#[derive(Default)]
pub struct FlakyLedger {
    inner: InMemoryLedger,
    fail_writes: AtomicBool,
}

#[allow(dead_code)]
impl FlakyLedger {
    pub fn failing() -> Self {
        let ledger = Self::default();
        ledger.set_failing(true);
        ledger
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl BookingLedger for FlakyLedger {
    async fn record(&self, booking: &Booking) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage("connection reset".to_string()));
        }
        self.inner.record(booking).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, LedgerError> {
        self.inner.get(id).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, LedgerError> {
        self.inner.list_for_user(user_id).await
    }

    async fn superseded_by(&self, id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        self.inner.superseded_by(id).await
    }

    async fn active_bookings(&self) -> Result<Vec<Booking>, LedgerError> {
        self.inner.active_bookings().await
    }
}
