use campusbook_api::middleware::error_handling::AppError;
use campusbook_core::{
    errors::BookingError,
    lifecycle::{self, CancelOutcome},
    models::{
        booking::{Booking, BookingStatus, CreateBookingRequest, UpdateBookingStatusRequest},
        user::{User, UserRole},
    },
};
use campusbook_db::models::DbBooking;
use chrono::{NaiveDate, Utc};
use mockall::predicate;
use uuid::Uuid;

use crate::test_utils::TestContext;

// Mirrors the booking creation flow with the repository mocked out
async fn create_flow(
    ctx: &mut TestContext,
    user: &User,
    payload: CreateBookingRequest,
) -> Result<Booking, AppError> {
    let new_booking = lifecycle::validate_new_booking(&payload)?;

    // Static references for mockall
    let faculty_name: &'static str =
        Box::leak(user.display_name().to_string().into_boxed_str());
    let booking_reason: &'static str =
        Box::leak(new_booking.booking_reason.clone().into_boxed_str());

    let db_booking = ctx
        .booking_repo
        .create_booking(
            new_booking.hall_id,
            user.id,
            faculty_name,
            booking_reason,
            new_booking.booking_date,
            new_booking.period,
        )
        .await?
        .ok_or_else(|| {
            BookingError::Conflict("This slot is already booked or pending".to_string())
        })?;

    Ok(Booking::try_from(db_booking)?)
}

// Mirrors the admin review flow with the repository mocked out
async fn review_flow(
    ctx: &mut TestContext,
    id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> Result<Booking, AppError> {
    let db_booking = ctx
        .booking_repo
        .get_booking_by_id(id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;
    let current = Booking::try_from(db_booking)?;

    let update = lifecycle::plan_status_update(
        current.status,
        &payload.status,
        payload.rejection_reason.as_deref(),
    )?;

    let rejection_reason: Option<&'static str> = update
        .rejection_reason
        .map(|reason| &*Box::leak(reason.into_boxed_str()));

    let db_booking = ctx
        .booking_repo
        .update_booking_status(id, current.status, update.status, rejection_reason)
        .await?
        .ok_or_else(|| {
            BookingError::Validation("Only pending bookings can be updated".to_string())
        })?;

    Ok(Booking::try_from(db_booking)?)
}

// Mirrors the cancellation flow with the repository mocked out
async fn cancel_flow(
    ctx: &mut TestContext,
    requester: &User,
    id: Uuid,
) -> Result<CancelOutcome, AppError> {
    let db_booking = ctx
        .booking_repo
        .get_booking_by_id(id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;
    let booking = Booking::try_from(db_booking)?;

    lifecycle::can_cancel(requester.id, requester.role, booking.user_id)?;

    let outcome = lifecycle::plan_cancel(booking.status)?;
    if outcome == CancelOutcome::Cancelled {
        ctx.booking_repo.cancel_booking(id).await?;
    }

    Ok(outcome)
}

fn db_booking(id: Uuid, user_id: Uuid, status: BookingStatus) -> DbBooking {
    DbBooking {
        id,
        hall_id: Uuid::new_v4(),
        user_id,
        faculty_name: Some("Dr. Foster".to_string()),
        booking_reason: "Department seminar".to_string(),
        booking_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        period: 3,
        status: status.as_str().to_string(),
        rejection_reason: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn faculty_user(id: Uuid) -> User {
    User {
        id,
        username: "drfoster".to_string(),
        role: UserRole::Faculty,
        name: Some("Dr. Foster".to_string()),
        email: None,
        department: None,
        created_at: Utc::now(),
    }
}

fn admin_user(id: Uuid) -> User {
    User {
        id,
        username: "admin".to_string(),
        role: UserRole::Admin,
        name: Some("Administrator".to_string()),
        email: None,
        department: None,
        created_at: Utc::now(),
    }
}

fn booking_request(hall_id: Uuid) -> CreateBookingRequest {
    CreateBookingRequest {
        hall_id: hall_id.to_string(),
        booking_reason: "Department seminar".to_string(),
        booking_date: "2025-03-10".to_string(),
        period: 3,
    }
}

#[tokio::test]
async fn test_create_booking_success() {
    let mut ctx = TestContext::new();
    let hall_id = Uuid::new_v4();
    let user = faculty_user(Uuid::new_v4());
    let user_id = user.id;

    ctx.booking_repo
        .expect_create_booking()
        .with(
            predicate::eq(hall_id),
            predicate::eq(user.id),
            predicate::eq("Dr. Foster"),
            predicate::eq("Department seminar"),
            predicate::eq(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
            predicate::eq(3i16),
        )
        .times(1)
        .returning(move |hall_id, user_id, _, _, _, _| {
            Ok(Some(DbBooking {
                hall_id,
                ..db_booking(Uuid::new_v4(), user_id, BookingStatus::Pending)
            }))
        });

    let booking = create_flow(&mut ctx, &user, booking_request(hall_id))
        .await
        .expect("Booking should be created");

    assert_eq!(booking.hall_id, hall_id);
    assert_eq!(booking.user_id, user_id);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.faculty_name.as_deref(), Some("Dr. Foster"));
}

#[tokio::test]
async fn test_create_booking_slot_taken() {
    let mut ctx = TestContext::new();
    let user = faculty_user(Uuid::new_v4());

    // The insert lost the slot race and returned nothing
    ctx.booking_repo
        .expect_create_booking()
        .returning(|_, _, _, _, _, _| Ok(None));

    let result = create_flow(&mut ctx, &user, booking_request(Uuid::new_v4())).await;

    match result.unwrap_err().0 {
        BookingError::Conflict(message) => {
            assert_eq!(message, "This slot is already booked or pending")
        }
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_invalid_period() {
    let mut ctx = TestContext::new();
    let user = faculty_user(Uuid::new_v4());

    ctx.booking_repo.expect_create_booking().times(0);

    let mut payload = booking_request(Uuid::new_v4());
    payload.period = 9;

    let result = create_flow(&mut ctx, &user, payload).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "period must be between 1 and 8")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_review_accepts_pending_booking() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .with(predicate::eq(id))
        .returning(move |id| Ok(Some(db_booking(id, user_id, BookingStatus::Pending))));

    ctx.booking_repo
        .expect_update_booking_status()
        .with(
            predicate::eq(id),
            predicate::eq(BookingStatus::Pending),
            predicate::eq(BookingStatus::Accepted),
            predicate::eq(None::<&str>),
        )
        .times(1)
        .returning(move |id, _, status, _| {
            Ok(Some(DbBooking {
                status: status.as_str().to_string(),
                updated_at: Some(Utc::now()),
                ..db_booking(id, user_id, BookingStatus::Pending)
            }))
        });

    let payload = UpdateBookingStatusRequest {
        status: "accepted".to_string(),
        rejection_reason: None,
    };

    let booking = review_flow(&mut ctx, id, payload)
        .await
        .expect("Review should succeed");

    assert_eq!(booking.status, BookingStatus::Accepted);
    assert!(booking.updated_at.is_some());
}

#[tokio::test]
async fn test_review_rejection_requires_reason() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, Uuid::new_v4(), BookingStatus::Pending))));

    ctx.booking_repo.expect_update_booking_status().times(0);

    let payload = UpdateBookingStatusRequest {
        status: "rejected".to_string(),
        rejection_reason: None,
    };

    let result = review_flow(&mut ctx, id, payload).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "rejectionReason required when rejecting")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_review_rejection_stores_reason() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, user_id, BookingStatus::Pending))));

    ctx.booking_repo
        .expect_update_booking_status()
        .with(
            predicate::eq(id),
            predicate::eq(BookingStatus::Pending),
            predicate::eq(BookingStatus::Rejected),
            predicate::eq(Some("Double booked")),
        )
        .times(1)
        .returning(move |id, _, status, reason| {
            Ok(Some(DbBooking {
                status: status.as_str().to_string(),
                rejection_reason: reason.map(str::to_string),
                updated_at: Some(Utc::now()),
                ..db_booking(id, user_id, BookingStatus::Pending)
            }))
        });

    let payload = UpdateBookingStatusRequest {
        status: "rejected".to_string(),
        rejection_reason: Some("Double booked".to_string()),
    };

    let booking = review_flow(&mut ctx, id, payload)
        .await
        .expect("Review should succeed");

    assert_eq!(booking.status, BookingStatus::Rejected);
    assert_eq!(booking.rejection_reason.as_deref(), Some("Double booked"));
}

#[tokio::test]
async fn test_review_requires_pending_booking() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, Uuid::new_v4(), BookingStatus::Accepted))));

    ctx.booking_repo.expect_update_booking_status().times(0);

    let payload = UpdateBookingStatusRequest {
        status: "booked".to_string(),
        rejection_reason: None,
    };

    let result = review_flow(&mut ctx, id, payload).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "Only pending bookings can be updated")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_review_unknown_booking() {
    let mut ctx = TestContext::new();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(|_| Ok(None));

    let payload = UpdateBookingStatusRequest {
        status: "accepted".to_string(),
        rejection_reason: None,
    };

    let result = review_flow(&mut ctx, Uuid::new_v4(), payload).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(message) => assert_eq!(message, "Booking not found"),
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_review_loses_guarded_update_race() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, Uuid::new_v4(), BookingStatus::Pending))));

    // The booking moved out of pending between the read and the update
    ctx.booking_repo
        .expect_update_booking_status()
        .returning(|_, _, _, _| Ok(None));

    let payload = UpdateBookingStatusRequest {
        status: "accepted".to_string(),
        rejection_reason: None,
    };

    let result = review_flow(&mut ctx, id, payload).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "Only pending bookings can be updated")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_by_owner() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let owner = faculty_user(Uuid::new_v4());
    let owner_id = owner.id;

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, owner_id, BookingStatus::Accepted))));

    ctx.booking_repo
        .expect_cancel_booking()
        .with(predicate::eq(id))
        .times(1)
        .returning(move |id| {
            Ok(Some(DbBooking {
                status: BookingStatus::Cancelled.as_str().to_string(),
                ..db_booking(id, owner_id, BookingStatus::Accepted)
            }))
        });

    let outcome = cancel_flow(&mut ctx, &owner, id)
        .await
        .expect("Cancel should succeed");

    assert_eq!(outcome, CancelOutcome::Cancelled);
}

#[tokio::test]
async fn test_cancel_by_admin() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();
    let admin = admin_user(Uuid::new_v4());

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, owner_id, BookingStatus::Pending))));

    ctx.booking_repo
        .expect_cancel_booking()
        .times(1)
        .returning(move |id| {
            Ok(Some(DbBooking {
                status: BookingStatus::Cancelled.as_str().to_string(),
                ..db_booking(id, owner_id, BookingStatus::Pending)
            }))
        });

    let outcome = cancel_flow(&mut ctx, &admin, id)
        .await
        .expect("Cancel should succeed");

    assert_eq!(outcome, CancelOutcome::Cancelled);
}

#[tokio::test]
async fn test_cancel_by_other_faculty_is_forbidden() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let owner_id = Uuid::new_v4();
    let intruder = faculty_user(Uuid::new_v4());

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, owner_id, BookingStatus::Pending))));

    ctx.booking_repo.expect_cancel_booking().times(0);

    let result = cancel_flow(&mut ctx, &intruder, id).await;

    match result.unwrap_err().0 {
        BookingError::Authorization(message) => assert_eq!(message, "Forbidden"),
        e => panic!("Expected Authorization error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_already_cancelled_is_idempotent() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let owner = faculty_user(Uuid::new_v4());
    let owner_id = owner.id;

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, owner_id, BookingStatus::Cancelled))));

    // Nothing to write the second time around
    ctx.booking_repo.expect_cancel_booking().times(0);

    let outcome = cancel_flow(&mut ctx, &owner, id)
        .await
        .expect("Repeat cancel should succeed");

    assert_eq!(outcome, CancelOutcome::AlreadyCancelled);
}

#[tokio::test]
async fn test_cancel_rejected_booking_is_refused() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();
    let owner = faculty_user(Uuid::new_v4());
    let owner_id = owner.id;

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |id| Ok(Some(db_booking(id, owner_id, BookingStatus::Rejected))));

    ctx.booking_repo.expect_cancel_booking().times(0);

    let result = cancel_flow(&mut ctx, &owner, id).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert_eq!(message, "Cannot cancel a rejected booking")
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}
