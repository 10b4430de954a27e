use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Kind of bookable event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Show,
    Trip,
    Appointment,
}

impl EventType {
    /// SHOW and TRIP events are sold by seat, APPOINTMENT events by slot
    pub fn is_seated(self) -> bool {
        matches!(self, EventType::Show | EventType::Trip)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::Show => "SHOW",
            EventType::Trip => "TRIP",
            EventType::Appointment => "APPOINTMENT",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHOW" => Ok(EventType::Show),
            "TRIP" => Ok(EventType::Trip),
            "APPOINTMENT" => Ok(EventType::Appointment),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// An event as listed in the catalog. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Present for SHOW/TRIP, `None` for APPOINTMENT
    pub total_seats: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = Event {
            id: "evt-3".to_string(),
            event_type: EventType::Appointment,
            name: "Zakir Khan Live".to_string(),
            start_time: Utc::now(),
            total_seats: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "APPOINTMENT");
        assert!(json["totalSeats"].is_null());
        assert!(json.get("startTime").is_some());
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!("show".parse::<EventType>().unwrap(), EventType::Show);
        assert!("CONCERT".parse::<EventType>().is_err());
        assert!(EventType::Trip.is_seated());
        assert!(!EventType::Appointment.is_seated());
    }
}
