//! Target selection over the device registry.

use super::dispatcher::PushDispatcher;
use super::request::NotificationRequest;
use crate::config::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::AppResult;
use crate::repositories::{DeviceRepository, DeviceStore};

/// Sends notifications to sets of registered devices
///
/// Store errors propagate; delivery failures come back as `Ok(false)`.
#[derive(Clone)]
pub struct PushDeviceManager<S> {
    store: S,
    dispatcher: PushDispatcher,
}

impl PushDeviceManager<DeviceRepository> {
    /// Connects to the device database and selects the configured provider
    pub async fn connect(settings: &Settings) -> AppResult<Self> {
        let dispatcher = PushDispatcher::from_settings(&settings.push)?;
        let pool = establish_async_connection_pool(&settings.database).await?;
        Ok(Self::new(DeviceRepository::new(pool), dispatcher))
    }
}

impl<S: DeviceStore> PushDeviceManager<S> {
    pub fn new(store: S, dispatcher: PushDispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn dispatcher(&self) -> &PushDispatcher {
        &self.dispatcher
    }

    /// Sends one notification to every registered device
    pub async fn send_to_all(&self, request: &NotificationRequest) -> AppResult<bool> {
        let devices = self.store.list_all().await?;
        tracing::debug!(devices = devices.len(), "Sending push notification to all devices");
        Ok(self.dispatcher.send_push_notification(&devices, request).await)
    }

    /// Sends one notification to the devices owned by `user_id`
    pub async fn send_to_user(&self, user_id: i32, request: &NotificationRequest) -> AppResult<bool> {
        let devices = self.store.list_by_user(user_id).await?;
        tracing::debug!(user_id, devices = devices.len(), "Sending push notification to user");
        Ok(self.dispatcher.send_push_notification(&devices, request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, ProviderKind, PushSettings};
    use crate::error::AppError;
    use crate::models::Device;
    use crate::services::push::test_support::{CapturedRequest, MockServer, direct_client};
    use crate::services::push::zeropush_provider::ZeroPushProvider;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    struct InMemoryStore {
        devices: Vec<Device>,
    }

    impl InMemoryStore {
        fn new(entries: &[(Option<i32>, &str)]) -> Self {
            let devices = entries
                .iter()
                .enumerate()
                .map(|(index, (user_id, token))| Device {
                    id: index as i32 + 1,
                    user_id: *user_id,
                    ..Device::from_token(*token)
                })
                .collect();
            Self { devices }
        }
    }

    #[async_trait]
    impl DeviceStore for InMemoryStore {
        async fn list_all(&self) -> AppResult<Vec<Device>> {
            Ok(self.devices.clone())
        }

        async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Device>> {
            Ok(self
                .devices
                .iter()
                .filter(|d| d.user_id == Some(user_id))
                .cloned()
                .collect())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl DeviceStore for BrokenStore {
        async fn list_all(&self) -> AppResult<Vec<Device>> {
            Err(AppError::Internal {
                source: anyhow::anyhow!("registry unavailable"),
            })
        }

        async fn list_by_user(&self, _user_id: i32) -> AppResult<Vec<Device>> {
            self.list_all().await
        }
    }

    fn counting_responder(request: &CapturedRequest) -> (StatusCode, String) {
        let sent_count = request.form_values("device_tokens[]").len();
        (StatusCode::OK, json!({ "sent_count": sent_count }).to_string())
    }

    fn dispatcher_for(server: &MockServer) -> PushDispatcher {
        let config = ProviderConfig {
            auth_token: Some("zp-token".to_string()),
            api_url: Some(server.url("/notify")),
            ..Default::default()
        };
        let provider = ZeroPushProvider::new(&config)
            .unwrap()
            .with_client(direct_client());
        PushDispatcher::new(Arc::new(provider))
    }

    fn sample_store() -> InMemoryStore {
        InMemoryStore::new(&[
            (Some(1), "alice-phone"),
            (Some(2), "bob-phone"),
            (Some(1), "alice-tablet"),
            (None, "anonymous"),
        ])
    }

    #[tokio::test]
    async fn test_send_to_all_targets_every_device() {
        let server = MockServer::start(counting_responder).await;
        let manager = PushDeviceManager::new(sample_store(), dispatcher_for(&server));

        let sent = manager
            .send_to_all(&NotificationRequest::new("Hello everyone"))
            .await
            .unwrap();

        assert!(sent);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].form_values("device_tokens[]"),
            vec!["alice-phone", "bob-phone", "alice-tablet", "anonymous"]
        );
    }

    #[tokio::test]
    async fn test_send_to_user_targets_only_their_devices() {
        let server = MockServer::start(counting_responder).await;
        let manager = PushDeviceManager::new(sample_store(), dispatcher_for(&server));

        let sent = manager
            .send_to_user(1, &NotificationRequest::new("Hi Alice"))
            .await
            .unwrap();

        assert!(sent);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].form_values("device_tokens[]"),
            vec!["alice-phone", "alice-tablet"]
        );
    }

    #[tokio::test]
    async fn test_send_to_user_without_devices_makes_no_request() {
        let server = MockServer::start(counting_responder).await;
        let manager = PushDeviceManager::new(sample_store(), dispatcher_for(&server));

        let sent = manager
            .send_to_user(99, &NotificationRequest::new("Nobody home"))
            .await
            .unwrap();

        assert!(!sent);
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_all_with_empty_registry() {
        let server = MockServer::start(counting_responder).await;
        let manager = PushDeviceManager::new(InMemoryStore::new(&[]), dispatcher_for(&server));

        assert!(!manager.send_to_all(&NotificationRequest::new("Hi")).await.unwrap());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let server = MockServer::start(counting_responder).await;
        let manager = PushDeviceManager::new(BrokenStore, dispatcher_for(&server));

        let result = manager.send_to_user(1, &NotificationRequest::new("Hi")).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_fails_fast_without_credentials() {
        let settings = Settings {
            push: PushSettings {
                active: ProviderKind::ZeroPush,
                ..Default::default()
            },
            ..Default::default()
        };

        let result = PushDeviceManager::connect(&settings).await;

        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
