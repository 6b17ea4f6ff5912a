pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod periods;
