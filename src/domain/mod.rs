// Domain layer - data model and pure functions
pub mod errors;
pub mod reading;
pub mod station;
pub mod timestamp;
