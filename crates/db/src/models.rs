use campusbook_core::errors::BookingError;
use campusbook_core::models::booking::{Booking, BookingExportRow, BookingStatus};
use campusbook_core::models::hall::Hall;
use campusbook_core::models::user::{User, UserRole};
use campusbook_core::periods;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbHall {
    pub id: Uuid,
    pub name: String,
    pub capacity: String,
    pub location: Option<String>,
    pub amenities: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub hall_id: Uuid,
    pub user_id: Uuid,
    pub faculty_name: Option<String>,
    pub booking_reason: String,
    pub booking_date: NaiveDate,
    pub period: i16,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Export query row: a booking joined with its hall's name. Orphaned
/// bookings carry the raw hall id in `hall_name`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbExportRow {
    pub hall_name: String,
    pub faculty_name: Option<String>,
    pub booking_reason: String,
    pub booking_date: NaiveDate,
    pub period: i16,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = BookingError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|_| BookingError::Database(eyre!("User {} has unknown role {}", row.id, row.role)))?;

        Ok(User {
            id: row.id,
            username: row.username,
            role,
            name: row.name,
            email: row.email,
            department: row.department,
            created_at: row.created_at,
        })
    }
}

impl From<DbHall> for Hall {
    fn from(row: DbHall) -> Self {
        Hall {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            location: row.location,
            amenities: row.amenities,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbBooking> for Booking {
    type Error = BookingError;

    fn try_from(row: DbBooking) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(|_| {
            BookingError::Database(eyre!(
                "Booking {} has unknown status {}",
                row.id,
                row.status
            ))
        })?;

        Ok(Booking {
            id: row.id,
            hall_id: row.hall_id,
            user_id: row.user_id,
            faculty_name: row.faculty_name,
            booking_reason: row.booking_reason,
            booking_date: row.booking_date,
            period: row.period,
            status,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbExportRow> for BookingExportRow {
    type Error = BookingError;

    fn try_from(row: DbExportRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<BookingStatus>().map_err(|_| {
            BookingError::Database(eyre!("Export row has unknown status {}", row.status))
        })?;

        Ok(BookingExportRow {
            hall_name: row.hall_name,
            faculty_name: row.faculty_name,
            booking_reason: row.booking_reason,
            booking_date: row.booking_date,
            period: row.period,
            period_label: periods::period_label(row.period).unwrap_or_default().to_string(),
            status,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
        })
    }
}
