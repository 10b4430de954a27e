use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::Selection;

/// Broadcast whenever seats or slot capacity of an event change hands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityChanged {
    pub event_id: String,
    pub change: ChangeKind,
    #[serde(flatten)]
    pub selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Held,
    Booked,
    Released,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Held => "held",
            ChangeKind::Booked => "booked",
            ChangeKind::Released => "released",
        }
    }
}
