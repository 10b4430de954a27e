use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use wave_core::{
    Availability, Event, EventType, Hold, ReservationError, ReservationResult, Seat, SeatStatus,
    Selection, Slot,
};

use crate::event::CatalogError;

/// Initial inventory of an event
#[derive(Debug, Clone)]
pub enum Layout {
    Seats(Vec<String>),
    Slots(Vec<SlotSpec>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSpec {
    pub slot_id: String,
    pub slot_time: DateTime<Utc>,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy)]
enum SeatState {
    Available,
    Held { hold_id: Uuid, expires_at: DateTime<Utc> },
    Booked,
}

impl SeatState {
    fn status(&self, now: DateTime<Utc>) -> SeatStatus {
        match self {
            SeatState::Available => SeatStatus::Available,
            SeatState::Held { expires_at, .. } if *expires_at <= now => SeatStatus::Available,
            SeatState::Held { .. } => SeatStatus::Held,
            SeatState::Booked => SeatStatus::Booked,
        }
    }

    /// An expired hold no longer protects the seat
    fn claimable_by(&self, hold: Option<Uuid>, now: DateTime<Utc>) -> bool {
        match self {
            SeatState::Available => true,
            SeatState::Held { hold_id, expires_at } => *expires_at <= now || hold == Some(*hold_id),
            SeatState::Booked => false,
        }
    }
}

#[derive(Debug)]
struct SeatCell {
    seat_number: String,
    state: SeatState,
}

#[derive(Debug)]
struct SlotCell {
    slot_id: String,
    slot_time: DateTime<Utc>,
    capacity: u32,
    remaining: u32,
}

#[derive(Debug)]
enum Units {
    Seats { cells: Vec<SeatCell>, index: HashMap<String, usize> },
    Slots { cells: Vec<SlotCell>, index: HashMap<String, usize> },
}

#[derive(Debug)]
struct EventInventory {
    event_type: EventType,
    units: Units,
}

impl EventInventory {
    fn seat_indices(&self, seats: &[String]) -> ReservationResult<Vec<usize>> {
        let Units::Seats { index, .. } = &self.units else {
            return Err(ReservationError::InvalidSelection("event has no seat map".to_string()));
        };
        seats
            .iter()
            .map(|seat| {
                index
                    .get(seat)
                    .copied()
                    .ok_or_else(|| ReservationError::NotFound(format!("seat {}", seat)))
            })
            .collect()
    }

    fn slot_index(&self, slot_id: &str) -> ReservationResult<usize> {
        let Units::Slots { index, .. } = &self.units else {
            return Err(ReservationError::InvalidSelection("event has no slots".to_string()));
        };
        index
            .get(slot_id)
            .copied()
            .ok_or_else(|| ReservationError::NotFound(format!("slot {}", slot_id)))
    }

    fn snapshot(&self, now: DateTime<Utc>) -> Availability {
        match &self.units {
            Units::Seats { cells, .. } => Availability::Seats {
                seats: cells
                    .iter()
                    .map(|c| Seat { seat_number: c.seat_number.clone(), status: c.state.status(now) })
                    .collect(),
            },
            Units::Slots { cells, .. } => Availability::Slots {
                slots: cells
                    .iter()
                    .map(|c| Slot { slot_id: c.slot_id.clone(), slot_time: c.slot_time, remaining: c.remaining })
                    .collect(),
            },
        }
    }

    /// Moves every selected seat to `next` if all of them are claimable,
    /// otherwise changes nothing.
    fn claim_seats(
        &mut self,
        seats: &[String],
        hold: Option<Uuid>,
        next: SeatState,
        now: DateTime<Utc>,
    ) -> ReservationResult<()> {
        let indices = self.seat_indices(seats)?;
        let Units::Seats { cells, .. } = &mut self.units else {
            return Err(ReservationError::InvalidSelection("event has no seat map".to_string()));
        };

        let taken: Vec<&str> = indices
            .iter()
            .filter(|&&i| !cells[i].state.claimable_by(hold, now))
            .map(|&i| cells[i].seat_number.as_str())
            .collect();
        if !taken.is_empty() {
            return Err(ReservationError::Unavailable(format!("seats already taken: {}", taken.join(", "))));
        }

        for i in indices {
            cells[i].state = next;
        }
        Ok(())
    }
}

/// Owns the seat/slot state of every event. All mutation goes through
/// `try_reserve`, `release` and the hold operations; each of them checks and
/// mutates inside a single per-event critical section.
pub struct AvailabilityStore {
    events: RwLock<HashMap<String, Arc<Mutex<EventInventory>>>>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Create the inventory for a new event
    pub fn register(&self, event: &Event, layout: Layout) -> Result<(), CatalogError> {
        let units = match (layout, event.event_type.is_seated()) {
            (Layout::Seats(seats), true) => {
                if seats.is_empty() {
                    return Err(CatalogError::InvalidEvent("seated event needs at least one seat".to_string()));
                }
                let mut index = HashMap::with_capacity(seats.len());
                let mut cells = Vec::with_capacity(seats.len());
                for (i, seat_number) in seats.into_iter().enumerate() {
                    if index.insert(seat_number.clone(), i).is_some() {
                        return Err(CatalogError::InvalidEvent(format!("duplicate seat {}", seat_number)));
                    }
                    cells.push(SeatCell { seat_number, state: SeatState::Available });
                }
                Units::Seats { cells, index }
            }
            (Layout::Slots(slots), false) => {
                if slots.is_empty() {
                    return Err(CatalogError::InvalidEvent("appointment needs at least one slot".to_string()));
                }
                let mut index = HashMap::with_capacity(slots.len());
                let mut cells = Vec::with_capacity(slots.len());
                for (i, spec) in slots.into_iter().enumerate() {
                    if spec.capacity == 0 {
                        return Err(CatalogError::InvalidEvent(format!("slot {} has no capacity", spec.slot_id)));
                    }
                    if index.insert(spec.slot_id.clone(), i).is_some() {
                        return Err(CatalogError::InvalidEvent(format!("duplicate slot {}", spec.slot_id)));
                    }
                    cells.push(SlotCell {
                        slot_id: spec.slot_id,
                        slot_time: spec.slot_time,
                        capacity: spec.capacity,
                        remaining: spec.capacity,
                    });
                }
                Units::Slots { cells, index }
            }
            _ => {
                return Err(CatalogError::InvalidEvent(format!(
                    "layout does not match event type {}",
                    event.event_type
                )))
            }
        };

        let mut events = self.events.write();
        if events.contains_key(&event.id) {
            return Err(CatalogError::AlreadyExists(event.id.clone()));
        }
        events.insert(
            event.id.clone(),
            Arc::new(Mutex::new(EventInventory { event_type: event.event_type, units })),
        );
        Ok(())
    }

    /// Drop an event's inventory. Returns false if it was not registered.
    pub fn unregister(&self, event_id: &str) -> bool {
        self.events.write().remove(event_id).is_some()
    }

    fn inventory(&self, event_id: &str) -> ReservationResult<Arc<Mutex<EventInventory>>> {
        self.events
            .read()
            .get(event_id)
            .cloned()
            .ok_or_else(|| ReservationError::NotFound(format!("event {}", event_id)))
    }

    pub fn event_type(&self, event_id: &str) -> ReservationResult<EventType> {
        let inventory = self.inventory(event_id)?;
        let event_type = inventory.lock().event_type;
        Ok(event_type)
    }

    pub fn get_availability(&self, event_id: &str) -> ReservationResult<Availability> {
        let inventory = self.inventory(event_id)?;
        let snapshot = inventory.lock().snapshot(Utc::now());
        Ok(snapshot)
    }

    /// Atomically book the selected seats, or take one unit of the selected slot.
    ///
    /// Seats held under `hold` count as claimable for this call. Fails with
    /// `Unavailable` without changing anything if any seat is taken or the
    /// slot is exhausted.
    pub fn try_reserve(&self, event_id: &str, selection: &Selection, hold: Option<Uuid>) -> ReservationResult<()> {
        let inventory = self.inventory(event_id)?;
        let mut inv = inventory.lock();
        selection.validate_for(inv.event_type)?;

        match selection {
            Selection::Seats(seats) => {
                inv.claim_seats(seats, hold, SeatState::Booked, Utc::now())?;
            }
            Selection::Slot(slot_id) => {
                let i = inv.slot_index(slot_id)?;
                if let Units::Slots { cells, .. } = &mut inv.units {
                    let cell = &mut cells[i];
                    if cell.remaining == 0 {
                        return Err(ReservationError::Unavailable(format!("slot {} is fully booked", slot_id)));
                    }
                    cell.remaining -= 1;
                }
            }
        }

        debug!("Reserved {} on {}", selection.describe(), event_id);
        Ok(())
    }

    /// Undo a reservation: seats return to AVAILABLE, the slot gains one unit
    /// back up to its original capacity.
    pub fn release(&self, event_id: &str, selection: &Selection) -> ReservationResult<()> {
        let inventory = self.inventory(event_id)?;
        let mut inv = inventory.lock();
        selection.validate_for(inv.event_type)?;

        match selection {
            Selection::Seats(seats) => {
                let indices = inv.seat_indices(seats)?;
                if let Units::Seats { cells, .. } = &mut inv.units {
                    for i in indices {
                        cells[i].state = SeatState::Available;
                    }
                }
            }
            Selection::Slot(slot_id) => {
                let i = inv.slot_index(slot_id)?;
                if let Units::Slots { cells, .. } = &mut inv.units {
                    let cell = &mut cells[i];
                    if cell.remaining < cell.capacity {
                        cell.remaining += 1;
                    } else {
                        warn!("Release of slot {} on {} ignored, already at capacity", slot_id, event_id);
                    }
                }
            }
        }

        debug!("Released {} on {}", selection.describe(), event_id);
        Ok(())
    }

    /// Place a time-bounded hold on seats. Seats with an expired hold can be
    /// held again.
    pub fn hold(&self, event_id: &str, seats: &[String], expires_at: DateTime<Utc>) -> ReservationResult<Hold> {
        let inventory = self.inventory(event_id)?;
        let mut inv = inventory.lock();
        let selection = Selection::Seats(seats.to_vec());
        selection.validate_for(inv.event_type)?;

        let now = Utc::now();
        if expires_at <= now {
            return Err(ReservationError::InvalidSelection("hold expiry must be in the future".to_string()));
        }

        let hold_id = Uuid::new_v4();
        inv.claim_seats(seats, None, SeatState::Held { hold_id, expires_at }, now)?;

        Ok(Hold {
            hold_id,
            event_id: event_id.to_string(),
            seats: seats.to_vec(),
            expires_at,
        })
    }

    /// Drop a hold, returning its still-held seats to AVAILABLE. Returns the
    /// released seat numbers.
    pub fn release_hold(&self, event_id: &str, hold_id: Uuid) -> ReservationResult<Vec<String>> {
        let inventory = self.inventory(event_id)?;
        let mut inv = inventory.lock();
        let mut released = Vec::new();
        if let Units::Seats { cells, .. } = &mut inv.units {
            for cell in cells.iter_mut() {
                if matches!(cell.state, SeatState::Held { hold_id: h, .. } if h == hold_id) {
                    cell.state = SeatState::Available;
                    released.push(cell.seat_number.clone());
                }
            }
        }
        Ok(released)
    }

    /// Return every seat whose hold expired at or before `now` to AVAILABLE.
    /// Returns the released seats grouped by event.
    pub fn expire_holds(&self, now: DateTime<Utc>) -> Vec<(String, Vec<String>)> {
        let inventories: Vec<(String, Arc<Mutex<EventInventory>>)> = self
            .events
            .read()
            .iter()
            .map(|(id, inv)| (id.clone(), inv.clone()))
            .collect();

        let mut expired = Vec::new();
        for (event_id, inventory) in inventories {
            let mut inv = inventory.lock();
            let Units::Seats { cells, .. } = &mut inv.units else {
                continue;
            };
            let seats: Vec<String> = cells
                .iter_mut()
                .filter(|c| matches!(c.state, SeatState::Held { expires_at, .. } if expires_at <= now))
                .map(|c| {
                    c.state = SeatState::Available;
                    c.seat_number.clone()
                })
                .collect();
            if !seats.is_empty() {
                expired.push((event_id, seats));
            }
        }
        expired
    }
}

impl Default for AvailabilityStore {
    fn default() -> Self {
        Self::new()
    }
}
