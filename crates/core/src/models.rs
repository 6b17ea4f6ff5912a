pub mod booking;
pub mod event;
pub mod hall;
pub mod user;
