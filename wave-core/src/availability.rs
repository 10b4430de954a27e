use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::event::EventType;
use crate::{ReservationError, ReservationResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Held,
    Booked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_number: String,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub slot_id: String,
    pub slot_time: DateTime<Utc>,
    pub remaining: u32,
}

/// Point-in-time read of an event's inventory. Not guaranteed to stay valid
/// until a booking attempt completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Availability {
    Seats { seats: Vec<Seat> },
    Slots { slots: Vec<Slot> },
}

impl Availability {
    pub fn seat(&self, seat_number: &str) -> Option<&Seat> {
        match self {
            Availability::Seats { seats } => seats.iter().find(|s| s.seat_number == seat_number),
            Availability::Slots { .. } => None,
        }
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        match self {
            Availability::Slots { slots } => slots.iter().find(|s| s.slot_id == slot_id),
            Availability::Seats { .. } => None,
        }
    }
}

/// What a booking asks for: a set of seats, or exactly one slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Selection {
    #[serde(rename = "seats")]
    Seats(Vec<String>),
    #[serde(rename = "slotId")]
    Slot(String),
}

impl Selection {
    /// Checks the selection shape against the event type without touching inventory.
    pub fn validate_for(&self, event_type: EventType) -> ReservationResult<()> {
        match (self, event_type.is_seated()) {
            (Selection::Seats(seats), true) => {
                if seats.is_empty() {
                    return Err(ReservationError::InvalidSelection(
                        "at least one seat must be selected".to_string(),
                    ));
                }
                let mut seen = HashSet::with_capacity(seats.len());
                for seat in seats {
                    if seat.trim().is_empty() {
                        return Err(ReservationError::InvalidSelection("blank seat number".to_string()));
                    }
                    if !seen.insert(seat.as_str()) {
                        return Err(ReservationError::InvalidSelection(format!(
                            "seat {} selected more than once",
                            seat
                        )));
                    }
                }
                Ok(())
            }
            (Selection::Slot(slot_id), false) => {
                if slot_id.trim().is_empty() {
                    return Err(ReservationError::InvalidSelection("blank slot id".to_string()));
                }
                Ok(())
            }
            (Selection::Seats(_), false) => Err(ReservationError::InvalidSelection(format!(
                "{} events are booked by slot, not by seat",
                event_type
            ))),
            (Selection::Slot(_), true) => Err(ReservationError::InvalidSelection(format!(
                "{} events are booked by seat, not by slot",
                event_type
            ))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Selection::Seats(seats) => seats.join(", "),
            Selection::Slot(slot_id) => slot_id.clone(),
        }
    }
}

/// A time-bounded claim on seats while a user completes checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hold {
    pub hold_id: Uuid,
    pub event_id: String,
    pub seats: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_seat_selection_rejected() {
        let selection = Selection::Seats(vec![]);
        assert!(matches!(
            selection.validate_for(EventType::Show),
            Err(ReservationError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_duplicate_seats_rejected() {
        let selection = Selection::Seats(vec!["A1".into(), "A1".into()]);
        assert!(selection.validate_for(EventType::Trip).is_err());
    }

    #[test]
    fn test_shape_must_match_event_type() {
        let slot = Selection::Slot("slot-evt-3-0".into());
        let seats = Selection::Seats(vec!["A1".into()]);

        assert!(slot.validate_for(EventType::Appointment).is_ok());
        assert!(slot.validate_for(EventType::Show).is_err());
        assert!(seats.validate_for(EventType::Show).is_ok());
        assert!(seats.validate_for(EventType::Appointment).is_err());
    }

    #[test]
    fn test_availability_wire_format() {
        let availability = Availability::Seats {
            seats: vec![Seat { seat_number: "A1".into(), status: SeatStatus::Held }],
        };
        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["seats"][0]["seatNumber"], "A1");
        assert_eq!(json["seats"][0]["status"], "HELD");
    }
}
