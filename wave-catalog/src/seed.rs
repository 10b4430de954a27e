use chrono::{Duration, NaiveTime, Utc};
use tracing::info;

use wave_core::EventType;

use crate::event::{CatalogError, EventCatalog, NewEvent, NewSlot};

/// Demo listings: (id, type, name, days from now, seats)
const DEMO_EVENTS: [(&str, EventType, &str, i64, Option<u32>); 6] = [
    ("evt-1", EventType::Show, "Dune: Part Two", 1, Some(150)),
    ("evt-4", EventType::Show, "Oppenheimer", 2, Some(180)),
    ("evt-2", EventType::Trip, "Coldplay: Music of the Spheres", 5, Some(5000)),
    ("evt-5", EventType::Trip, "Ed Sheeran: +–=÷× Tour", 12, Some(4500)),
    ("evt-3", EventType::Appointment, "Zakir Khan Live", 7, None),
    ("evt-6", EventType::Appointment, "Anubhav Singh Bassi: Bas Kar Bassi", 10, None),
];

/// Appointment days run five single-capacity slots from 18:00 UTC
const DEMO_SLOTS: i64 = 5;
const DEMO_FIRST_SLOT_HOUR: i64 = 18;

/// Populate the catalog with the demo listings, every seat and slot available.
pub fn seed_demo(catalog: &EventCatalog) -> Result<usize, CatalogError> {
    let now = Utc::now();

    for (id, event_type, name, days, seats) in DEMO_EVENTS {
        let start_time = now + Duration::days(days);
        let day_start = start_time.date_naive().and_time(NaiveTime::MIN).and_utc();

        let slots = if event_type.is_seated() {
            vec![]
        } else {
            (0..DEMO_SLOTS)
                .map(|i| NewSlot {
                    slot_time: day_start + Duration::hours(DEMO_FIRST_SLOT_HOUR + i),
                    capacity: 1,
                })
                .collect()
        };

        catalog.create(NewEvent {
            id: Some(id.to_string()),
            event_type,
            name: name.to_string(),
            start_time,
            total_seats: seats,
            seat_map: None,
            slots,
        })?;
    }

    info!("Seeded {} demo events", DEMO_EVENTS.len());
    Ok(DEMO_EVENTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::inventory::AvailabilityStore;

    #[test]
    fn test_seed_demo() {
        let catalog = EventCatalog::new(Arc::new(AvailabilityStore::new()));
        assert_eq!(seed_demo(&catalog).unwrap(), 6);

        assert_eq!(catalog.list(Some(EventType::Appointment)).len(), 2);
        let snapshot = catalog.store().get_availability("evt-3").unwrap();
        assert_eq!(snapshot.slot("slot-evt-3-4").unwrap().remaining, 1);

        // Seeding twice collides on ids
        assert!(seed_demo(&catalog).is_err());
    }
}
