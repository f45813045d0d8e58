//! ZeroPush push provider implementation.
//!
//! Sends one form-encoded request per notification to the ZeroPush `notify`
//! endpoint. Unlike OneSignal, a send only counts as delivered when the
//! response body is a well-formed delivery report.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use super::provider::{DeliveryReport, PushOutcome, PushProvider};
use super::request::{NotificationRequest, process_expiry};
use crate::config::{ConfigError, ProviderConfig};
use crate::external::client::{DEFAULT_REQUEST_TIMEOUT, HTTP_CLIENT};
use crate::models::Device;

/// Notification endpoint of the ZeroPush API
pub const ZEROPUSH_NOTIFY_URL: &str = "https://api.zeropush.com/notify";

/// ZeroPush push provider
#[derive(Clone)]
pub struct ZeroPushProvider {
    auth_token: String,
    api_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ZeroPushProvider {
    /// Creates a provider from its configuration block
    ///
    /// # Errors
    /// `ConfigError::MissingCredential` if no auth token is configured,
    /// `ConfigError::ValidationError` for a zero timeout or a non-http(s) endpoint
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let auth_token = config
            .auth_token()
            .ok_or_else(|| ConfigError::missing_credential("ZeroPush", "AUTH_TOKEN"))?
            .to_string();
        config.validate("push.zeropush")?;

        Ok(Self {
            auth_token,
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| ZEROPUSH_NOTIFY_URL.to_string()),
            timeout: Duration::from_secs(config.timeout_seconds).min(DEFAULT_REQUEST_TIMEOUT),
            client: HTTP_CLIENT.clone(),
        })
    }

    /// Replaces the shared HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Builds the form fields: one `device_tokens[]` per device in order,
    /// then each optional field that is present
    fn build_form(
        &self,
        devices: &[Device],
        request: &NotificationRequest,
    ) -> Vec<(&'static str, String)> {
        let mut form: Vec<(&'static str, String)> = devices
            .iter()
            .map(|d| ("device_tokens[]", d.token.clone()))
            .collect();

        if let Some(message) = &request.message {
            form.push(("alert", message.clone()));
        }

        if let Some(badge) = request.badge_number {
            form.push(("badge", badge.to_string()));
        }

        if let Some(sound) = &request.sound {
            form.push(("sound", sound.clone()));
        }

        if let Some(payload) = &request.payload {
            form.push(("info", serde_json::Value::Object(payload.clone()).to_string()));
        }

        if let Some(expiry) = &request.expiry {
            form.push(("expiry", process_expiry(expiry).to_string()));
        }

        if let Some(category) = &request.category {
            form.push(("category", category.clone()));
        }

        form
    }

    fn log_stale_tokens(&self, report: &DeliveryReport) {
        if !report.inactive_tokens.is_empty() {
            tracing::warn!(
                provider = self.name(),
                tokens = ?report.inactive_tokens,
                "ZeroPush reported inactive device tokens"
            );
        }

        if !report.unregistered_tokens.is_empty() {
            tracing::warn!(
                provider = self.name(),
                tokens = ?report.unregistered_tokens,
                "ZeroPush reported unregistered device tokens"
            );
        }
    }
}

#[async_trait]
impl PushProvider for ZeroPushProvider {
    async fn send(&self, devices: &[Device], request: &NotificationRequest) -> PushOutcome {
        if devices.is_empty() {
            tracing::debug!(provider = self.name(), "No devices to notify, skipping request");
            return PushOutcome::NoDevices;
        }

        let start = Instant::now();
        let form = self.build_form(devices, request);

        let response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Token token=\"{}\"", self.auth_token))
            .form(&form)
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(provider = self.name(), error = %e, "Push notification request failed");
                return PushOutcome::Failed {
                    reason: e.to_string(),
                    duration_ms: start.elapsed().as_millis() as u64,
                };
            }
        };

        let status = resp.status();
        let response_text = resp.text().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let response_text = response_text.ok();
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

        let parsed = response_text
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str::<DeliveryReport>(&text).map_err(Into::into));

        match parsed {
            Ok(report) => {
                self.log_stale_tokens(&report);
                tracing::info!(
                    provider = self.name(),
                    devices = devices.len(),
                    sent_count = report.sent_count,
                    duration_ms,
                    "Push notification sent"
                );
                PushOutcome::Sent {
                    status_code: status.as_u16(),
                    report: Some(report),
                    duration_ms,
                }
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.name(),
                    status = status.as_u16(),
                    error = %e,
                    "ZeroPush returned an unreadable response"
                );
                PushOutcome::Failed {
                    reason: format!("Malformed ZeroPush response: {}", e),
                    duration_ms,
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "zeropush"
    }
}
