//! STARS: a course-enrollment engine with timetable-clash, capacity, and
//! load-cap enforcement, exposed over a small JSON API.

pub mod config;
pub mod db;
pub mod engine;
pub mod notify;
pub mod server;
pub mod types;
