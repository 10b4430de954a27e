use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use wave_core::{Event, EventType};

use crate::inventory::{AvailabilityStore, Layout, SlotSpec};
use crate::layout::{generate_rows, parse_seat_map};
use crate::repository::EventRepository;

/// Largest seat count a single event may declare unless configured otherwise
pub const DEFAULT_MAX_SEATS: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Event already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid seat map: {0}")]
    InvalidSeatMap(String),

    #[error("Event storage error: {0}")]
    Storage(String),
}

/// Admin request to create an event. Also the stored definition an event is
/// rebuilt from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub total_seats: Option<u32>,
    /// Seat ranges like `"A1-A10, B1-B5"`; rows are generated from
    /// `total_seats` when absent
    pub seat_map: Option<String>,
    #[serde(default)]
    pub slots: Vec<NewSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    pub slot_time: DateTime<Utc>,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 { 1 }

/// Event metadata plus the hand-off of each new event's layout to the
/// availability store.
pub struct EventCatalog {
    events: RwLock<HashMap<String, Event>>,
    store: Arc<AvailabilityStore>,
    max_seats: u32,
    repository: Option<Arc<dyn EventRepository>>,
}

impl EventCatalog {
    pub fn new(store: Arc<AvailabilityStore>) -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            store,
            max_seats: DEFAULT_MAX_SEATS,
            repository: None,
        }
    }

    pub fn with_max_seats(mut self, max_seats: u32) -> Self {
        self.max_seats = max_seats;
        self
    }

    /// Persist published events so they survive a restart
    pub fn with_repository(mut self, repository: Arc<dyn EventRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn store(&self) -> &Arc<AvailabilityStore> {
        &self.store
    }

    /// Create an event and save its definition. If the save fails the event
    /// is removed again and the error returned.
    pub async fn publish(&self, req: NewEvent) -> Result<Event, CatalogError> {
        let mut definition = req.clone();
        let event = self.create(req)?;

        if let Some(repository) = &self.repository {
            definition.id = Some(event.id.clone());
            if let Err(e) = repository.save(&definition).await {
                error!("Saving event {} failed: {}, discarding it", event.id, e);
                self.discard(&event.id);
                return Err(e);
            }
        }
        Ok(event)
    }

    /// Rebuild every saved event. Definitions that no longer validate are
    /// skipped with a warning.
    pub async fn restore(&self) -> Result<usize, CatalogError> {
        let Some(repository) = &self.repository else {
            return Ok(0);
        };

        let mut restored = 0;
        for definition in repository.load_all().await? {
            match self.create(definition) {
                Ok(_) => restored += 1,
                Err(e) => warn!("Skipping stored event: {}", e),
            }
        }
        info!("Restored {} stored events", restored);
        Ok(restored)
    }

    fn discard(&self, event_id: &str) {
        self.events.write().remove(event_id);
        self.store.unregister(event_id);
    }

    /// Validate and register an event in memory only
    pub fn create(&self, req: NewEvent) -> Result<Event, CatalogError> {
        let name = req.name.trim().to_string();
        if name.chars().count() < 3 {
            return Err(CatalogError::InvalidEvent("name is too short".to_string()));
        }
        if let Some(total) = req.total_seats {
            if total > self.max_seats {
                return Err(CatalogError::InvalidEvent(format!(
                    "totalSeats {} exceeds the limit of {}",
                    total, self.max_seats
                )));
            }
        }

        let id = req.id.unwrap_or_else(|| format!("evt-{}", Uuid::new_v4().simple()));

        let (layout, total_seats) = if req.event_type.is_seated() {
            let seats = match (&req.seat_map, req.total_seats) {
                (Some(map), _) => parse_seat_map(map, self.max_seats)?,
                (None, Some(total)) if total > 0 => generate_rows(total),
                _ => {
                    return Err(CatalogError::InvalidEvent(
                        "seated events need totalSeats or a seat map".to_string(),
                    ))
                }
            };
            if let Some(total) = req.total_seats {
                if total as usize != seats.len() {
                    return Err(CatalogError::InvalidEvent(format!(
                        "seat map has {} seats but totalSeats is {}",
                        seats.len(),
                        total
                    )));
                }
            }
            let total = seats.len() as u32;
            (Layout::Seats(seats), Some(total))
        } else {
            if req.slots.is_empty() {
                return Err(CatalogError::InvalidEvent("appointments need at least one slot".to_string()));
            }
            let slots = req
                .slots
                .iter()
                .enumerate()
                .map(|(i, slot)| SlotSpec {
                    slot_id: format!("slot-{}-{}", id, i),
                    slot_time: slot.slot_time,
                    capacity: slot.capacity,
                })
                .collect();
            (Layout::Slots(slots), None)
        };

        let event = Event {
            id,
            event_type: req.event_type,
            name,
            start_time: req.start_time,
            total_seats,
            created_at: Utc::now(),
        };

        let mut events = self.events.write();
        if events.contains_key(&event.id) {
            return Err(CatalogError::AlreadyExists(event.id));
        }
        self.store.register(&event, layout)?;
        events.insert(event.id.clone(), event.clone());

        info!("Event created: {} ({}, {})", event.id, event.event_type, event.name);
        Ok(event)
    }

    pub fn get(&self, event_id: &str) -> Option<Event> {
        self.events.read().get(event_id).cloned()
    }

    /// Events ordered by start time, optionally restricted to one type
    pub fn list(&self, filter: Option<EventType>) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .values()
            .filter(|e| filter.map_or(true, |t| e.event_type == t))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use parking_lot::Mutex;
    use wave_core::SeatStatus;

    #[derive(Default)]
    struct MemoryRepository {
        definitions: Mutex<Vec<NewEvent>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl EventRepository for MemoryRepository {
        async fn save(&self, definition: &NewEvent) -> Result<(), CatalogError> {
            if self.fail_writes {
                return Err(CatalogError::Storage("disk full".to_string()));
            }
            self.definitions.lock().push(definition.clone());
            Ok(())
        }

        async fn load_all(&self) -> Result<Vec<NewEvent>, CatalogError> {
            Ok(self.definitions.lock().clone())
        }
    }

    fn catalog() -> EventCatalog {
        EventCatalog::new(Arc::new(AvailabilityStore::new()))
    }

    fn show(name: &str) -> NewEvent {
        NewEvent {
            id: None,
            event_type: EventType::Show,
            name: name.to_string(),
            start_time: Utc::now() + Duration::days(1),
            total_seats: Some(20),
            seat_map: None,
            slots: vec![],
        }
    }

    #[test]
    fn test_create_show_generates_seats() {
        let catalog = catalog();
        let event = catalog.create(show("Oppenheimer")).unwrap();

        assert_eq!(event.total_seats, Some(20));
        let snapshot = catalog.store().get_availability(&event.id).unwrap();
        assert_eq!(snapshot.seat("B2").unwrap().status, SeatStatus::Available);
    }

    #[test]
    fn test_create_with_seat_map() {
        let catalog = catalog();
        let mut req = show("Coldplay");
        req.event_type = EventType::Trip;
        req.total_seats = None;
        req.seat_map = Some("GA1-GA4".to_string());

        let event = catalog.create(req).unwrap();
        assert_eq!(event.total_seats, Some(4));
    }

    #[test]
    fn test_seat_map_must_match_total() {
        let catalog = catalog();
        let mut req = show("Coldplay");
        req.seat_map = Some("A1-A4".to_string());
        assert!(matches!(catalog.create(req), Err(CatalogError::InvalidEvent(_))));
    }

    #[test]
    fn test_create_appointment() {
        let catalog = catalog();
        let start = Utc::now() + Duration::days(7);
        let req = NewEvent {
            id: Some("evt-3".to_string()),
            event_type: EventType::Appointment,
            name: "Zakir Khan Live".to_string(),
            start_time: start,
            total_seats: None,
            seat_map: None,
            slots: vec![
                NewSlot { slot_time: start, capacity: 1 },
                NewSlot { slot_time: start + Duration::hours(1), capacity: 3 },
            ],
        };

        let event = catalog.create(req).unwrap();
        assert_eq!(event.total_seats, None);

        let snapshot = catalog.store().get_availability("evt-3").unwrap();
        assert_eq!(snapshot.slot("slot-evt-3-1").unwrap().remaining, 3);
    }

    #[test]
    fn test_rejects_short_names_and_duplicates() {
        let catalog = catalog();
        assert!(catalog.create(show("Up")).is_err());

        let mut req = show("Dune: Part Two");
        req.id = Some("evt-1".to_string());
        catalog.create(req.clone()).unwrap();
        assert!(matches!(catalog.create(req), Err(CatalogError::AlreadyExists(_))));
    }

    #[test]
    fn test_list_filters_by_type() {
        let catalog = catalog();
        catalog.create(show("Dune: Part Two")).unwrap();
        let mut trip = show("Ed Sheeran Tour");
        trip.event_type = EventType::Trip;
        catalog.create(trip).unwrap();

        assert_eq!(catalog.list(None).len(), 2);
        let trips = catalog.list(Some(EventType::Trip));
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].name, "Ed Sheeran Tour");
    }

    #[test]
    fn test_seat_count_is_capped() {
        let catalog = catalog().with_max_seats(100);

        let mut huge = show("Dune: Part Two");
        huge.total_seats = Some(u32::MAX);
        assert!(matches!(catalog.create(huge), Err(CatalogError::InvalidEvent(_))));

        let mut huge_map = show("Dune: Part Two");
        huge_map.total_seats = None;
        huge_map.seat_map = Some("A1-A4294967295".to_string());
        assert!(matches!(catalog.create(huge_map), Err(CatalogError::InvalidSeatMap(_))));

        let mut at_limit = show("Dune: Part Two");
        at_limit.total_seats = Some(100);
        assert!(catalog.create(at_limit).is_ok());
    }

    #[tokio::test]
    async fn test_published_events_survive_restart() {
        let repository = Arc::new(MemoryRepository::default());
        let before = catalog().with_repository(repository.clone());
        let event = before.publish(show("Interstellar")).await.unwrap();

        let after = catalog().with_repository(repository);
        assert_eq!(after.restore().await.unwrap(), 1);

        let restored = after.get(&event.id).unwrap();
        assert_eq!(restored.name, "Interstellar");
        assert!(after.store().get_availability(&event.id).is_ok());
    }

    #[tokio::test]
    async fn test_failed_save_discards_event() {
        let repository = Arc::new(MemoryRepository { fail_writes: true, ..Default::default() });
        let catalog = catalog().with_repository(repository);

        let mut req = show("Interstellar");
        req.id = Some("evt-9".to_string());
        assert!(matches!(catalog.publish(req).await, Err(CatalogError::Storage(_))));

        assert!(catalog.get("evt-9").is_none());
        assert!(catalog.store().get_availability("evt-9").is_err());
    }
}
