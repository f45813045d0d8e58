//! Parameters of a single push notification send.

use std::time::Duration;

use jiff::Timestamp;
use serde_json::{Map, Value};

/// When a notification stops being worth delivering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// An absolute point in time
    At(Timestamp),
    /// A time-to-live
    After(Duration),
}

impl From<Timestamp> for Expiry {
    fn from(timestamp: Timestamp) -> Self {
        Expiry::At(timestamp)
    }
}

impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        Expiry::After(duration)
    }
}

/// Normalizes an expiry to the integer seconds providers accept.
///
/// A duration yields its total whole seconds, days included: one day plus
/// 90 seconds is 86490, not 90. An absolute time yields only its
/// seconds-of-minute (0..=59), not an offset from now: existing senders rely
/// on this value, so it is kept as-is.
pub fn process_expiry(expiry: &Expiry) -> u64 {
    match expiry {
        Expiry::At(timestamp) => timestamp.as_second().rem_euclid(60) as u64,
        Expiry::After(duration) => duration.as_secs(),
    }
}

/// Everything a provider needs to know about one notification
///
/// Optional fields are sent only when present; providers never emit a
/// placeholder or `null` for an absent one.
///
/// # Example
/// ```ignore
/// let request = NotificationRequest::new("Your order shipped")
///     .with_badge(1)
///     .with_sound("default")
///     .with_expiry(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationRequest {
    /// Alert text
    pub message: Option<String>,
    /// Badge count to set on the app icon
    pub badge_number: Option<u32>,
    /// Sound file name
    pub sound: Option<String>,
    /// Custom data delivered alongside the alert
    pub payload: Option<Map<String, Value>>,
    pub expiry: Option<Expiry>,
    pub category: Option<String>,
}

impl NotificationRequest {
    /// A request carrying an alert message
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A request without alert text, e.g. a badge-only update
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_badge(mut self, badge_number: u32) -> Self {
        self.badge_number = Some(badge_number);
        self
    }

    pub fn with_sound<S: Into<String>>(mut self, sound: S) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_expiry<E: Into<Expiry>>(mut self, expiry: E) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_process_expiry_duration() {
        assert_eq!(process_expiry(&Expiry::After(Duration::from_secs(90))), 90);
    }

    #[test]
    fn test_process_expiry_duration_keeps_days() {
        let one_day_and_ninety = Duration::from_secs(24 * 60 * 60 + 90);
        assert_eq!(process_expiry(&Expiry::After(one_day_and_ninety)), 86_490);
    }

    #[test]
    fn test_process_expiry_timestamp_keeps_seconds_of_minute() {
        let timestamp: Timestamp = "2024-03-10T14:25:37Z".parse().unwrap();
        assert_eq!(process_expiry(&Expiry::At(timestamp)), 37);
    }

    #[test]
    fn test_process_expiry_timestamp_before_epoch() {
        let timestamp: Timestamp = "1969-12-31T23:59:58Z".parse().unwrap();
        assert_eq!(process_expiry(&Expiry::At(timestamp)), 58);
    }

    #[test]
    fn test_builder_sets_only_requested_fields() {
        let mut payload = Map::new();
        payload.insert("order_id".to_string(), json!(42));

        let request = NotificationRequest::new("Hi")
            .with_badge(5)
            .with_payload(payload.clone())
            .with_expiry(Duration::from_secs(60));

        assert_eq!(request.message.as_deref(), Some("Hi"));
        assert_eq!(request.badge_number, Some(5));
        assert_eq!(request.payload, Some(payload));
        assert_eq!(request.expiry, Some(Expiry::After(Duration::from_secs(60))));
        assert!(request.sound.is_none());
        assert!(request.category.is_none());
    }

    #[test]
    fn test_silent_request_has_no_message() {
        let request = NotificationRequest::silent().with_badge(0);
        assert!(request.message.is_none());
        assert_eq!(request.badge_number, Some(0));
    }

    proptest! {
        #[test]
        fn prop_duration_expiry_is_whole_seconds(secs in 0u64..=10_000_000, nanos in 0u32..1_000_000_000) {
            let expiry = Expiry::After(Duration::new(secs, nanos));
            prop_assert_eq!(process_expiry(&expiry), secs);
        }

        #[test]
        fn prop_timestamp_expiry_is_seconds_of_minute(secs in -2_000_000_000i64..=4_000_000_000i64) {
            let timestamp = Timestamp::from_second(secs).unwrap();
            let seconds = process_expiry(&Expiry::At(timestamp));
            prop_assert!(seconds < 60);
            prop_assert_eq!(seconds as i64, secs.rem_euclid(60));
        }
    }
}
