//! Push notification adapters for OneSignal and ZeroPush.
//!
//! Devices live in a PostgreSQL registry; notifications are sent through the
//! provider chosen in configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod services;

pub use crate::config::Settings;
pub use error::{AppError, AppResult};
pub use models::{Device, Platform};
pub use services::push::{
    DeliveryReport, Expiry, NotificationRequest, PushDeviceManager, PushDispatcher, PushOutcome,
    PushProvider,
};

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
