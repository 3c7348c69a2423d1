// src/models/mod.rs

//! Domain models for the schedule client.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod notification;
mod schedule;
mod subscription;
mod target;

// Re-export all public types
pub use config::{BackendConfig, Config, NotificationConfig, ScheduleConfig, StorageConfig};
pub use notification::{CachedNotification, Notification};
pub use schedule::{
    Couple, CoupleNumber, LessonCard, LessonVariant, RawCouple, RawDay, RawLabel, RawSchedule,
    ScheduleDay, group_couples,
};
pub use subscription::{Ack, ReleaseInfo, SubscribeRequest, SubscriptionEntry};
pub use target::{DirectoryKind, Target, TargetType, TrackedType};
