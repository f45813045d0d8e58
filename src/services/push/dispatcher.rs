//! Provider selection and the single entry point for sending.

use std::sync::Arc;

use super::onesignal_provider::OneSignalProvider;
use super::provider::{PushOutcome, PushProvider};
use super::request::NotificationRequest;
use super::zeropush_provider::ZeroPushProvider;
use crate::config::{ConfigError, ProviderConfig, ProviderKind, PushSettings};
use crate::models::Device;

/// Builds the provider for the given kind
///
/// # Errors
/// `ConfigError::MissingCredential` if the configuration has no auth token
pub fn create_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Arc<dyn PushProvider>, ConfigError> {
    let provider: Arc<dyn PushProvider> = match kind {
        ProviderKind::OneSignal => Arc::new(OneSignalProvider::new(config)?),
        ProviderKind::ZeroPush => Arc::new(ZeroPushProvider::new(config)?),
    };
    Ok(provider)
}

/// Sends notifications through the provider chosen at startup
///
/// Cloning is cheap; the provider is shared.
#[derive(Clone)]
pub struct PushDispatcher {
    provider: Arc<dyn PushProvider>,
}

impl PushDispatcher {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    /// Creates a dispatcher for the active provider in `settings`
    pub fn from_settings(settings: &PushSettings) -> Result<Self, ConfigError> {
        let provider = create_provider(settings.active, settings.active_config())?;
        tracing::info!(provider = provider.name(), "Push provider initialized");
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Sends one notification to the given devices
    pub async fn send(&self, devices: &[Device], request: &NotificationRequest) -> PushOutcome {
        self.provider.send(devices, request).await
    }

    /// Sends one notification and reports only whether it was delivered
    pub async fn send_push_notification(
        &self,
        devices: &[Device],
        request: &NotificationRequest,
    ) -> bool {
        self.provider.send_push_notification(devices, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::push::test_support::devices;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the tokens of every send instead of calling out
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl PushProvider for RecordingProvider {
        async fn send(&self, devices: &[Device], _request: &NotificationRequest) -> PushOutcome {
            if devices.is_empty() {
                return PushOutcome::NoDevices;
            }
            self.calls
                .lock()
                .unwrap()
                .push(devices.iter().map(|d| d.token.clone()).collect());
            PushOutcome::Sent {
                status_code: 200,
                report: None,
                duration_ms: 0,
            }
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[test]
    fn test_create_provider_by_kind() {
        let config = ProviderConfig::with_auth_token("tok");
        assert_eq!(
            create_provider(ProviderKind::OneSignal, &config).unwrap().name(),
            "onesignal"
        );
        assert_eq!(
            create_provider(ProviderKind::ZeroPush, &config).unwrap().name(),
            "zeropush"
        );
    }

    #[test]
    fn test_from_settings_uses_active_provider() {
        let settings = PushSettings {
            active: ProviderKind::ZeroPush,
            zeropush: ProviderConfig::with_auth_token("zp"),
            ..Default::default()
        };
        let dispatcher = PushDispatcher::from_settings(&settings).unwrap();
        assert_eq!(dispatcher.provider_name(), "zeropush");
    }

    #[test]
    fn test_from_settings_without_token_fails() {
        let settings = PushSettings {
            active: ProviderKind::OneSignal,
            zeropush: ProviderConfig::with_auth_token("zp"),
            ..Default::default()
        };
        let err = PushDispatcher::from_settings(&settings).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                provider: "OneSignal",
                key: "AUTH_TOKEN"
            }
        ));
    }

    #[test]
    fn test_from_settings_rejects_invalid_active_block() {
        let settings = PushSettings {
            active: ProviderKind::OneSignal,
            onesignal: ProviderConfig {
                timeout_seconds: 0,
                ..ProviderConfig::with_auth_token("os")
            },
            ..Default::default()
        };
        assert!(matches!(
            PushDispatcher::from_settings(&settings),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatcher_delegates_to_provider() {
        let provider = Arc::new(RecordingProvider::default());
        let dispatcher = PushDispatcher::new(provider.clone());

        assert!(
            dispatcher
                .send_push_notification(&devices(&["a", "b"]), &NotificationRequest::new("Hi"))
                .await
        );
        assert!(
            !dispatcher
                .send_push_notification(&[], &NotificationRequest::new("Hi"))
                .await
        );

        let calls = provider.calls.lock().unwrap();
        assert_eq!(*calls, vec![vec!["a".to_string(), "b".to_string()]]);
    }
}
