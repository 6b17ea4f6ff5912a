pub mod auth;
pub mod bookings;
pub mod events;
pub mod halls;
pub mod users;
