//! OneSignal push provider implementation.
//!
//! Sends one JSON request per notification to the OneSignal REST API,
//! targeting iOS device tokens directly.
//!
//! OneSignal API Reference: https://documentation.onesignal.com/reference

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use super::provider::{DeliveryReport, PushOutcome, PushProvider};
use super::request::NotificationRequest;
use crate::config::{ConfigError, ProviderConfig};
use crate::external::client::{DEFAULT_REQUEST_TIMEOUT, HTTP_CLIENT};
use crate::models::Device;

/// Base URL of the OneSignal REST API
pub const ONESIGNAL_API_URL: &str = "https://onesignal.com/api/v1/";

/// Notification creation endpoint
pub const ONESIGNAL_NOTIFICATIONS_URL: &str = "https://onesignal.com/api/v1/notifications";

/// Success body of the create-notification call
#[derive(Debug, Deserialize)]
struct OneSignalResponse {
    #[serde(default)]
    recipients: u64,
    #[serde(default)]
    errors: Option<OneSignalErrors>,
}

/// `errors` may be a list of messages or an object naming rejected tokens
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneSignalErrors {
    Tokens {
        #[serde(default)]
        invalid_ios_tokens: Vec<String>,
    },
    Messages(Vec<String>),
}

/// OneSignal push provider
///
/// # Example
/// ```ignore
/// let config = ProviderConfig {
///     auth_token: Some("rest-api-key".to_string()),
///     app_id: Some("app-uuid".to_string()),
///     ..Default::default()
/// };
/// let provider = OneSignalProvider::new(&config)?;
/// let sent = provider
///     .send_push_notification(&devices, &NotificationRequest::new("Hi"))
///     .await;
/// ```
#[derive(Clone)]
pub struct OneSignalProvider {
    auth_token: String,
    app_id: Option<String>,
    api_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OneSignalProvider {
    /// Creates a provider from its configuration block
    ///
    /// # Errors
    /// `ConfigError::MissingCredential` if no auth token is configured,
    /// `ConfigError::ValidationError` for a zero timeout or a non-http(s) endpoint
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let auth_token = config
            .auth_token()
            .ok_or_else(|| ConfigError::missing_credential("OneSignal", "AUTH_TOKEN"))?
            .to_string();
        config.validate("push.onesignal")?;

        if config.app_id.is_none() {
            tracing::warn!("OneSignal configured without APP_ID; requests will not name an app");
        }

        Ok(Self {
            auth_token,
            app_id: config.app_id.clone(),
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| ONESIGNAL_NOTIFICATIONS_URL.to_string()),
            timeout: Duration::from_secs(config.timeout_seconds).min(DEFAULT_REQUEST_TIMEOUT),
            client: HTTP_CLIENT.clone(),
        })
    }

    /// Replaces the shared HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Builds the request body for the create-notification call
    ///
    /// Expiry and category have no OneSignal counterpart here and are not sent.
    /// Without a configured APP_ID the `app_id` key is left out entirely
    /// rather than sent as `null`.
    fn build_request_body(
        &self,
        devices: &[Device],
        request: &NotificationRequest,
    ) -> serde_json::Value {
        let tokens: Vec<&str> = devices.iter().map(|d| d.token.as_str()).collect();

        let mut body = json!({
            "isIos": true,
            "include_ios_tokens": tokens,
        });

        if let Some(app_id) = &self.app_id {
            body["app_id"] = json!(app_id);
        }

        if let Some(message) = &request.message {
            body["contents"] = json!({ "en": message });
        }

        if let Some(sound) = &request.sound {
            body["ios_sound"] = json!(sound);
        }

        if let Some(badge) = request.badge_number {
            body["ios_badgeType"] = json!("SetTo");
            body["ios_badgeCount"] = json!(badge);
        }

        if let Some(payload) = &request.payload {
            body["data"] = json!(payload);
        }

        body
    }

    /// Extracts recipient count and rejected tokens, if the body has them
    fn parse_report(response: &str) -> Option<DeliveryReport> {
        let parsed: OneSignalResponse = serde_json::from_str(response).ok()?;
        let unregistered_tokens = match parsed.errors {
            Some(OneSignalErrors::Tokens { invalid_ios_tokens }) => invalid_ios_tokens,
            Some(OneSignalErrors::Messages(messages)) => {
                tracing::warn!(provider = "onesignal", errors = ?messages, "OneSignal reported errors");
                Vec::new()
            }
            None => Vec::new(),
        };

        Some(DeliveryReport {
            sent_count: parsed.recipients,
            inactive_tokens: Vec::new(),
            unregistered_tokens,
        })
    }
}

#[async_trait]
impl PushProvider for OneSignalProvider {
    /// Sends a notification via OneSignal
    ///
    /// Any 2xx status counts as delivered; the body is only read for its
    /// delivery report.
    async fn send(&self, devices: &[Device], request: &NotificationRequest) -> PushOutcome {
        if devices.is_empty() {
            tracing::debug!(provider = self.name(), "No devices to notify, skipping request");
            return PushOutcome::NoDevices;
        }

        let start = Instant::now();
        let body = self.build_request_body(devices, request);

        let response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", self.auth_token))
            .body(body.to_string())
            .send()
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let response_text = resp.text().await.ok();

                if !status.is_success() {
                    tracing::warn!(
                        provider = self.name(),
                        status = status.as_u16(),
                        response = response_text.as_deref().unwrap_or_default(),
                        "Push notification rejected"
                    );
                    return PushOutcome::Rejected {
                        status_code: status.as_u16(),
                        response: response_text,
                        duration_ms,
                    };
                }

                let report = response_text.as_deref().and_then(Self::parse_report);
                if let Some(report) = report.as_ref().filter(|r| r.has_stale_tokens()) {
                    tracing::warn!(
                        provider = self.name(),
                        unregistered = ?report.unregistered_tokens,
                        "OneSignal rejected some device tokens"
                    );
                }

                tracing::info!(
                    provider = self.name(),
                    devices = devices.len(),
                    status = status.as_u16(),
                    duration_ms,
                    "Push notification sent"
                );
                PushOutcome::Sent {
                    status_code: status.as_u16(),
                    report,
                    duration_ms,
                }
            }
            Err(e) => {
                tracing::warn!(provider = self.name(), error = %e, "Push notification request failed");
                PushOutcome::Failed {
                    reason: e.to_string(),
                    duration_ms,
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "onesignal"
    }
}
