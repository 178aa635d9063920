//! HTTP Client with Connection Pooling
//!
//! Provides a single shared blocking client so every quote, build, submit
//! and balance call reuses connections instead of re-handshaking TLS.

use reqwest::blocking::Client;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{SolsticeError, SolsticeResult};

/// Global HTTP client instance - lazy initialized
static GLOBAL_CLIENT: OnceLock<Client> = OnceLock::new();

fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(5)
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .user_agent("Solstice/1.0")
        .build()
        // Client construction only fails if TLS initialization fails,
        // which is a system-level issue; nothing in the crate can run
        // without HTTP.
        .expect("HTTP client initialization failed - check TLS configuration")
}

/// Get the shared HTTP client
pub fn get_client() -> &'static Client {
    GLOBAL_CLIENT.get_or_init(build_client)
}

/// Make a GET request
pub fn get(url: &str) -> SolsticeResult<reqwest::blocking::Response> {
    get_client()
        .get(url)
        .send()
        .map_err(SolsticeError::from)
}

/// Make a POST request with a JSON body
pub fn post_json<T: serde::Serialize>(
    url: &str,
    body: &T,
) -> SolsticeResult<reqwest::blocking::Response> {
    get_client()
        .post(url)
        .json(body)
        .send()
        .map_err(SolsticeError::from)
}
