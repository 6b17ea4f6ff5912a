//! Booking lifecycle rules. Handlers fetch the current booking and the
//! caller's identity; the functions here decide what may change. Nothing
//! in this module touches storage.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::booking::{BookingStatus, CreateBookingRequest};
use crate::models::user::UserRole;
use crate::periods;

/// A create request that passed validation, ready for the conditional
/// insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub hall_id: Uuid,
    pub booking_reason: String,
    pub booking_date: NaiveDate,
    pub period: i16,
}

pub fn validate_new_booking(request: &CreateBookingRequest) -> BookingResult<NewBooking> {
    if request.hall_id.is_empty()
        || request.booking_reason.trim().is_empty()
        || request.booking_date.is_empty()
        || request.period == 0
    {
        return Err(BookingError::Validation(
            "hallId, bookingReason, bookingDate, period required".to_string(),
        ));
    }

    let hall_id = Uuid::parse_str(&request.hall_id)
        .map_err(|_| BookingError::Validation("hallId must be a valid id".to_string()))?;

    let booking_date = NaiveDate::parse_from_str(&request.booking_date, "%Y-%m-%d").map_err(
        |_| BookingError::Validation("bookingDate must be formatted YYYY-MM-DD".to_string()),
    )?;

    if !periods::is_valid_period(request.period) {
        return Err(BookingError::Validation(format!(
            "period must be between {} and {}",
            periods::PERIOD_MIN,
            periods::PERIOD_MAX
        )));
    }

    Ok(NewBooking {
        hall_id,
        booking_reason: request.booking_reason.trim().to_string(),
        booking_date,
        period: request.period as i16,
    })
}

/// The persisted outcome of an admin decision on a pending booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: BookingStatus,
    pub rejection_reason: Option<String>,
}

/// Plans an admin status update. Only pending bookings may be decided,
/// and the reachable targets are accepted, booked and rejected. Rejecting
/// requires a reason; accepting discards any stored one.
pub fn plan_status_update(
    current: BookingStatus,
    requested: &str,
    rejection_reason: Option<&str>,
) -> BookingResult<StatusUpdate> {
    let target: BookingStatus = requested.parse()?;

    if current != BookingStatus::Pending {
        return Err(BookingError::Validation(
            "Only pending bookings can be updated".to_string(),
        ));
    }

    match target {
        BookingStatus::Accepted | BookingStatus::Booked => Ok(StatusUpdate {
            status: target,
            rejection_reason: None,
        }),
        BookingStatus::Rejected => {
            match rejection_reason.map(str::trim).filter(|reason| !reason.is_empty()) {
                Some(reason) => Ok(StatusUpdate {
                    status: BookingStatus::Rejected,
                    rejection_reason: Some(reason.to_string()),
                }),
                None => Err(BookingError::Validation(
                    "rejectionReason required when rejecting".to_string(),
                )),
            }
        }
        BookingStatus::Pending | BookingStatus::Cancelled => Err(BookingError::Validation(
            "status must be accepted, booked or rejected".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Persist the cancellation and publish the event.
    Cancelled,
    /// Nothing to do; report success without a write or an event.
    AlreadyCancelled,
}

/// A booking may be cancelled by its owner or by an admin.
pub fn can_cancel(
    requester_id: Uuid,
    requester_role: UserRole,
    owner_id: Uuid,
) -> BookingResult<()> {
    if requester_role == UserRole::Admin || requester_id == owner_id {
        Ok(())
    } else {
        Err(BookingError::Authorization("Forbidden".to_string()))
    }
}

pub fn plan_cancel(current: BookingStatus) -> BookingResult<CancelOutcome> {
    match current {
        BookingStatus::Cancelled => Ok(CancelOutcome::AlreadyCancelled),
        BookingStatus::Rejected => Err(BookingError::Validation(
            "Cannot cancel a rejected booking".to_string(),
        )),
        BookingStatus::Pending | BookingStatus::Accepted | BookingStatus::Booked => {
            Ok(CancelOutcome::Cancelled)
        }
    }
}
