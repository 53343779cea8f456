use std::time::Duration;

use crate::config::ApiConfig;

/// Builds the HTTP client all API calls go through.
///
/// One client per `HttpApi`, built once at wiring time and reused for every
/// request: connection pooling, DNS caching, and both timeouts taken from
/// configuration.
///
/// - **Compression**: gzip, deflate, brotli, and zstd
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **Timeouts**: `api.request_timeout` / `api.connect_timeout` seconds
/// - **TLS**: Rustls (no OpenSSL dependency)
pub(crate) fn build_client(config: &ApiConfig) -> reqwest::Client {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
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
        // Security
        .https_only(false)
        .use_rustls_tls()
        .build()
        .expect("Failed to build HTTP client")
}
