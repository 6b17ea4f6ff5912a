pub mod auth;
pub mod bookings;
pub mod events;
pub mod halls;
pub mod health;
pub mod users;
