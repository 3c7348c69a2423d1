// src/lib.rs

//! Offline-first client library for the college schedule backend.

pub mod client;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use client::ScheduleClient;
pub use error::{AppError, Result};
