use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use wave_core::{Booking, BookingLedger, LedgerError};

#[derive(Default)]
struct LedgerState {
    records: HashMap<Uuid, Booking>,
    /// Insertion order per user, oldest first
    by_user: HashMap<String, Vec<Uuid>>,
    /// closed record -> record that closed it
    superseded: HashMap<Uuid, Uuid>,
}

/// Process-local ledger, used when no database is configured
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn record(&self, booking: &Booking) -> Result<(), LedgerError> {
        let mut state = self.state.write();

        if state.records.contains_key(&booking.id) {
            return Err(LedgerError::DuplicateId(booking.id));
        }
        if let Some(closed) = booking.supersedes {
            if state.superseded.contains_key(&closed) {
                return Err(LedgerError::AlreadySuperseded(closed));
            }
            state.superseded.insert(closed, booking.id);
        }

        state
            .by_user
            .entry(booking.user_id.clone())
            .or_default()
            .push(booking.id);
        state.records.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, LedgerError> {
        Ok(self.state.read().records.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, LedgerError> {
        let state = self.state.read();
        let bookings = state
            .by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .rev()
                    .filter_map(|id| state.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(bookings)
    }

    async fn superseded_by(&self, id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        Ok(self.state.read().superseded.get(&id).copied())
    }

    async fn active_bookings(&self) -> Result<Vec<Booking>, LedgerError> {
        let state = self.state.read();
        let mut active: Vec<Booking> = state
            .records
            .values()
            .filter(|b| b.is_confirmed() && !state.superseded.contains_key(&b.id))
            .cloned()
            .collect();
        active.sort_by_key(|b| b.created_at);
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_core::Selection;

    fn booking(user: &str) -> Booking {
        Booking::pending(user, "evt-1", Selection::Seats(vec!["A1".to_string()])).confirm()
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let ledger = InMemoryLedger::new();
        let b = booking("u1");

        ledger.record(&b).await.unwrap();
        assert!(matches!(ledger.record(&b).await, Err(LedgerError::DuplicateId(id)) if id == b.id));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let ledger = InMemoryLedger::new();
        let first = booking("u1");
        let second = booking("u1");
        let other = booking("u2");

        ledger.record(&first).await.unwrap();
        ledger.record(&other).await.unwrap();
        ledger.record(&second).await.unwrap();

        let listed = ledger.list_for_user("u1").await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        // Restartable: same answer on a second read
        assert_eq!(ledger.list_for_user("u1").await.unwrap(), listed);
        assert!(ledger.list_for_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_supersede_only_once() {
        let ledger = InMemoryLedger::new();
        let original = booking("u1");
        ledger.record(&original).await.unwrap();

        let cancel = original.cancellation();
        ledger.record(&cancel).await.unwrap();
        assert_eq!(ledger.superseded_by(original.id).await.unwrap(), Some(cancel.id));

        let again = original.cancellation();
        assert!(matches!(ledger.record(&again).await, Err(LedgerError::AlreadySuperseded(_))));

        // History is preserved
        assert_eq!(ledger.get(original.id).await.unwrap(), Some(original));
        assert_eq!(ledger.list_for_user("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_active_bookings_skip_closed_and_failed() {
        let ledger = InMemoryLedger::new();
        let kept = booking("u1");
        let cancelled = booking("u1");
        let failed = Booking::pending("u2", "evt-1", Selection::Seats(vec!["A3".to_string()]))
            .fail(wave_core::FailureReason::Unavailable);

        ledger.record(&kept).await.unwrap();
        ledger.record(&cancelled).await.unwrap();
        ledger.record(&cancelled.cancellation()).await.unwrap();
        ledger.record(&failed).await.unwrap();

        let active = ledger.active_bookings().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);
    }
}
