//! Utility functions and helpers.

pub mod date;
pub mod http;
pub mod sort;

pub use date::{day_timestamp, is_current_day, local_midnight};
pub use sort::{compare_cabinets, compare_groups, compare_teachers, sort_directory};
