use std::sync::LazyLock;
use std::time::Duration;

/// Request timeout applied when a provider does not ask for a shorter one
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Global HTTP client shared by every push provider
///
/// Initialized lazily on first access. `reqwest::Client` is internally
/// reference counted and safe to use from many tasks at once, so providers
/// never build their own.
///
/// # Features
/// - **Connection pooling**: keeps idle connections to the provider hosts
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **Timeouts**: 30s request timeout, 10s connect timeout
/// - **TLS**: Rustls, no OpenSSL dependency
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// let response = HTTP_CLIENT
///     .post("https://onesignal.com/api/v1/notifications")
///     .body(body)
///     .send()
///     .await?;
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .expect("Failed to build HTTP client")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        // Access the client to ensure it initializes without panicking
        let _ = &*HTTP_CLIENT;
    }
}
