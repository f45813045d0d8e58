//! Push notification delivery.
//!
//! Provides a unified interface for sending one notification to a set of
//! registered devices through the provider selected in configuration.
//!
//! # Supported Providers
//! - **OneSignal**: JSON API, iOS device tokens
//! - **ZeroPush**: form-encoded API with per-token delivery report
//!
//! # Example
//! ```ignore
//! let dispatcher = PushDispatcher::from_settings(&settings.push)?;
//! let delivered = dispatcher
//!     .send_push_notification(&devices, &NotificationRequest::new("Hi").with_badge(1))
//!     .await;
//! ```

mod dispatcher;
mod manager;
mod onesignal_provider;
mod provider;
mod request;
mod zeropush_provider;

#[cfg(test)]
mod test_support;

pub use dispatcher::{PushDispatcher, create_provider};
pub use manager::PushDeviceManager;
pub use onesignal_provider::{ONESIGNAL_API_URL, ONESIGNAL_NOTIFICATIONS_URL, OneSignalProvider};
pub use provider::{DeliveryReport, PushOutcome, PushProvider};
pub use request::{Expiry, NotificationRequest, process_expiry};
pub use zeropush_provider::{ZEROPUSH_NOTIFY_URL, ZeroPushProvider};
