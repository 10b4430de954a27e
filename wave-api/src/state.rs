use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use wave_booking::ReservationCoordinator;
use wave_catalog::EventCatalog;
use wave_core::events::{AvailabilityChanged, ChangeKind};
use wave_core::{BookingLedger, Selection};

const CHANGE_BUFFER: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<EventCatalog>,
    pub coordinator: Arc<ReservationCoordinator>,
    pub changes_tx: broadcast::Sender<AvailabilityChanged>,
}

impl AppState {
    pub fn new(catalog: Arc<EventCatalog>, ledger: Arc<dyn BookingLedger>, hold_ttl: Duration) -> Self {
        let coordinator = ReservationCoordinator::new(catalog.store().clone(), ledger).with_hold_ttl(hold_ttl);
        let (changes_tx, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            catalog,
            coordinator: Arc::new(coordinator),
            changes_tx,
        }
    }

    /// Fan an availability change out to stream subscribers. Nobody listening is fine.
    pub fn notify(&self, event_id: &str, change: ChangeKind, selection: Selection, booking_id: Option<Uuid>) {
        let _ = self.changes_tx.send(AvailabilityChanged {
            event_id: event_id.to_string(),
            change,
            selection,
            booking_id,
            at: Utc::now().timestamp(),
        });
    }
}
