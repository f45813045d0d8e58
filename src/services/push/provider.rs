//! Core push provider trait and types.
//!
//! This module provides the abstraction over push backends, allowing the
//! active provider to be chosen by configuration at startup.

use crate::models::Device;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::request::NotificationRequest;

/// Per-token delivery information reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Number of devices the provider accepted the notification for
    pub sent_count: u64,
    /// Tokens the provider considers inactive
    #[serde(default)]
    pub inactive_tokens: Vec<String>,
    /// Tokens the provider no longer knows about
    #[serde(default)]
    pub unregistered_tokens: Vec<String>,
}

impl DeliveryReport {
    /// Whether the provider flagged any token as inactive or unregistered
    pub fn has_stale_tokens(&self) -> bool {
        !self.inactive_tokens.is_empty() || !self.unregistered_tokens.is_empty()
    }
}

/// Result of a push send attempt
///
/// Transport and remote failures are values, not errors: callers that only
/// care about success use [`PushOutcome::is_sent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The provider answered with a 2xx status (and, where required, a
    /// well-formed body)
    Sent {
        status_code: u16,
        report: Option<DeliveryReport>,
        duration_ms: u64,
    },
    /// Nothing to send; no request was made
    NoDevices,
    /// The provider answered with a non-2xx status
    Rejected {
        status_code: u16,
        response: Option<String>,
        duration_ms: u64,
    },
    /// The request could not be completed or its response was unusable
    Failed { reason: String, duration_ms: u64 },
}

impl PushOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, PushOutcome::Sent { .. })
    }

    /// HTTP status returned by the provider, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PushOutcome::Sent { status_code, .. } | PushOutcome::Rejected { status_code, .. } => {
                Some(*status_code)
            }
            PushOutcome::NoDevices | PushOutcome::Failed { .. } => None,
        }
    }

    /// Delivery report, when the provider returned one
    pub fn report(&self) -> Option<&DeliveryReport> {
        match self {
            PushOutcome::Sent { report, .. } => report.as_ref(),
            _ => None,
        }
    }
}

/// Trait for push notification backends (OneSignal, ZeroPush, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// Implementations issue at most one HTTP request per `send` and none at all
/// for an empty device list.
///
/// # Example Implementation
/// ```ignore
/// #[async_trait]
/// impl PushProvider for MyProvider {
///     async fn send(&self, devices: &[Device], request: &NotificationRequest) -> PushOutcome {
///         if devices.is_empty() {
///             return PushOutcome::NoDevices;
///         }
///         // build the body, POST it, map the response
///     }
///
///     fn name(&self) -> &'static str {
///         "my-provider"
///     }
/// }
/// ```
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Sends one notification to all given devices in a single request
    async fn send(&self, devices: &[Device], request: &NotificationRequest) -> PushOutcome;

    /// Returns the provider name for logging/debugging
    fn name(&self) -> &'static str;

    /// Sends and reduces the outcome to success/failure
    ///
    /// `false` covers an empty device list, a rejected request and a failed
    /// one alike; use [`PushProvider::send`] to tell them apart.
    async fn send_push_notification(
        &self,
        devices: &[Device],
        request: &NotificationRequest,
    ) -> bool {
        self.send(devices, request).await.is_sent()
    }
}
