use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Booked,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Statuses that occupy a slot. `booked` is a legacy alias of
    /// `accepted` that still appears in old data and counts the same.
    pub const LIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Booked,
    ];

    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Booked,
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
    ];

    pub fn is_live(&self) -> bool {
        Self::LIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Booked => "booked",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "booked" => Ok(BookingStatus::Booked),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::Validation(format!(
                "Unknown booking status: {other}"
            ))),
        }
    }
}

/// A reservation of one hall for one period on one date. `faculty_name`
/// is a snapshot of the requester's display name at creation time and is
/// not kept in sync with later account changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub hall_id: Uuid,
    pub user_id: Uuid,
    pub faculty_name: Option<String>,
    pub booking_reason: String,
    pub booking_date: NaiveDate,
    pub period: i16,
    pub status: BookingStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create payload as received. Fields default so that absent keys reach
/// validation (which answers 400) instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub hall_id: String,
    #[serde(default)]
    pub booking_reason: String,
    #[serde(default)]
    pub booking_date: String,
    #[serde(default)]
    pub period: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    #[serde(default)]
    pub status: String,
    pub rejection_reason: Option<String>,
}

/// One row of the reporting boundary: a booking joined with its hall's
/// name and the period's catalog label. Rendering to a file format is the
/// caller's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingExportRow {
    pub hall_name: String,
    pub faculty_name: Option<String>,
    pub booking_reason: String,
    pub booking_date: NaiveDate,
    pub period: i16,
    pub period_label: String,
    pub status: BookingStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
