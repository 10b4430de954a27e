use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::availability::Selection;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Failed => "FAILED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "FAILED" => Ok(BookingStatus::Failed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Why a booking resolved to FAILED
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FailureReason {
    Unavailable,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Unavailable => "Unavailable",
        }
    }
}

/// A booking attempt and its outcome.
///
/// Only the coordinator ever holds a `Pending` booking; once resolved the
/// record is written to the ledger and never changed. A later status change
/// is a new record whose `supersedes` points at the one it closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "bookingId")]
    pub id: Uuid,
    pub user_id: String,
    pub event_id: String,
    #[serde(flatten)]
    pub selection: Selection,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn pending(user_id: impl Into<String>, event_id: impl Into<String>, selection: Selection) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            selection,
            status: BookingStatus::Pending,
            reason: None,
            supersedes: None,
            created_at: Utc::now(),
        }
    }

    pub fn confirm(mut self) -> Self {
        self.status = BookingStatus::Confirmed;
        self
    }

    pub fn fail(mut self, reason: FailureReason) -> Self {
        self.status = BookingStatus::Failed;
        self.reason = Some(reason);
        self
    }

    /// Builds the CANCELLED record that closes this booking
    pub fn cancellation(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            event_id: self.event_id.clone(),
            selection: self.selection.clone(),
            status: BookingStatus::Cancelled,
            reason: None,
            supersedes: Some(self.id),
            created_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}
