use std::time::Duration;

use chrono::Utc;
use tracing::info;

use wave_core::events::ChangeKind;
use wave_core::Selection;

use crate::state::AppState;

/// Periodically return expired holds to the pool. Expired holds already read
/// as available; this only clears them from stored state and tells subscribers.
pub async fn start_hold_sweeper(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
    info!("Hold sweeper started, running every {:?}", every);

    loop {
        ticker.tick().await;
        sweep_expired_holds(&state);
    }
}

/// One sweep pass, returns the number of seats released
pub fn sweep_expired_holds(state: &AppState) -> usize {
    let mut released = 0;
    for (event_id, seats) in state.coordinator.store().expire_holds(Utc::now()) {
        info!("Released {} expired held seats on {}", seats.len(), event_id);
        released += seats.len();
        state.notify(&event_id, ChangeKind::Released, Selection::Seats(seats), None);
    }
    released
}
