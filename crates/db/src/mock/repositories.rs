use campusbook_core::models::booking::BookingStatus;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbBooking, DbExportRow, DbHall, DbSession, DbUser};

// Mock repositories for testing
mock! {
    pub UserRepo {
        pub async fn create_user(
            &self,
            username: &'static str,
            password_hash: &'static str,
            role: &'static str,
            name: Option<&'static str>,
            email: Option<&'static str>,
            department: Option<&'static str>,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn get_user_by_username(
            &self,
            username: &'static str,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn get_user_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn list_users(&self) -> eyre::Result<Vec<DbUser>>;

        pub async fn count_admins(&self) -> eyre::Result<i64>;

        pub async fn delete_user(&self, id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub SessionRepo {
        pub async fn create_session(
            &self,
            token: &'static str,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<DbSession>;

        pub async fn find_session_user(
            &self,
            token: &'static str,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn delete_session(&self, token: &'static str) -> eyre::Result<()>;

        pub async fn delete_expired_sessions(&self) -> eyre::Result<u64>;
    }
}

mock! {
    pub HallRepo {
        pub async fn create_hall(
            &self,
            name: &'static str,
            capacity: &'static str,
            location: Option<&'static str>,
            amenities: Option<&'static str>,
        ) -> eyre::Result<DbHall>;

        pub async fn list_halls(&self) -> eyre::Result<Vec<DbHall>>;

        pub async fn delete_hall(&self, id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub BookingRepo {
        pub async fn create_booking(
            &self,
            hall_id: Uuid,
            user_id: Uuid,
            faculty_name: &'static str,
            booking_reason: &'static str,
            booking_date: NaiveDate,
            period: i16,
        ) -> eyre::Result<Option<DbBooking>>;

        pub async fn get_booking_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbBooking>>;

        pub async fn list_bookings(
            &self,
            hall_id: Option<Uuid>,
            user_id: Option<Uuid>,
        ) -> eyre::Result<Vec<DbBooking>>;

        pub async fn update_booking_status(
            &self,
            id: Uuid,
            current: BookingStatus,
            status: BookingStatus,
            rejection_reason: Option<&'static str>,
        ) -> eyre::Result<Option<DbBooking>>;

        pub async fn cancel_booking(&self, id: Uuid) -> eyre::Result<Option<DbBooking>>;

        pub async fn list_export_rows(&self) -> eyre::Result<Vec<DbExportRow>>;
    }
}
