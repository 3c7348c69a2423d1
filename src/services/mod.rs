//! Service layer for the schedule client.
//!
//! - Backend API access (`BackendClient`)
//! - Directory lists with offline fallback (`DirectoryService`)
//! - Schedules and the superseded-request guard (`ScheduleService`, `ScheduleLoader`)
//! - Subscriptions (`SubscriptionManager`)
//! - Notification history (`NotificationService`, `NotificationCache`)
//! - Push tokens (`DeviceTokenCache`)
//! - Favorites and last target (`Preferences`)
//! - Update checks (`ReleaseChecker`)

mod backend;
mod device_token;
mod directory;
mod notifications;
mod preferences;
mod releases;
mod schedule;
mod subscriptions;

pub use backend::{BackendClient, ensure_success, normalize_transport_error};
pub use device_token::{DeviceTokenCache, PermissionStatus, PushProvider};
pub use directory::{DirectoryRefresh, DirectoryService};
pub use notifications::{NotificationCache, NotificationService};
pub use preferences::Preferences;
pub use releases::{ReleaseChecker, parse_version};
pub use schedule::{
    LoadOutcome, RequestGuard, RequestTicket, ScheduleLoader, ScheduleService, normalize_couple,
    normalize_schedule, retain_current,
};
pub use subscriptions::SubscriptionManager;
