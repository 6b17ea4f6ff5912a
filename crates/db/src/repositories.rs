pub mod bookings;
pub mod halls;
pub mod sessions;
pub mod users;
