use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::booking::Booking;
use super::hall::Hall;

/// A mutation notice fanned out to every connected observer. Serializes
/// as `{"event": "<name>", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChangeEvent {
    #[serde(rename = "hall:created")]
    HallCreated(Hall),
    #[serde(rename = "booking:created")]
    BookingCreated(Booking),
    #[serde(rename = "booking:updated")]
    BookingUpdated(Booking),
    #[serde(rename = "booking:cancelled")]
    BookingCancelled(CancelledBooking),
}

/// `booking:cancelled` carries only the id; observers re-fetch when they
/// need the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledBooking {
    pub id: Uuid,
}

impl ChangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::HallCreated(_) => "hall:created",
            ChangeEvent::BookingCreated(_) => "booking:created",
            ChangeEvent::BookingUpdated(_) => "booking:updated",
            ChangeEvent::BookingCancelled(_) => "booking:cancelled",
        }
    }
}
