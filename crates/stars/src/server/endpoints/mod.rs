pub mod catalog;
pub mod enrollment;
pub mod schedule;
pub mod status;
