//! Shared helpers for integration tests against a wiremock server.

#![allow(dead_code)]

use std::io::Write;

use asc_analytics::{AnalyticsClient, ClientConfig, Credentials, RetryPolicy};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_KEY: &str = include_str!("../fixtures/test_key.p8");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_key.pub.pem");

/// Client pointed at `{server}/v1` with fast retries.
pub fn client(server: &MockServer) -> AnalyticsClient {
    client_with_retry(server, RetryPolicy::immediate(3))
}

pub fn client_with_retry(server: &MockServer, retry: RetryPolicy) -> AnalyticsClient {
    let credentials = Credentials::new("69a6de80-test-issuer", "KEYID12345", TEST_KEY).unwrap();
    let config = ClientConfig::default()
        .with_base_url(format!("{}/v1", server.uri()))
        .with_retry(retry);
    AnalyticsClient::new(credentials, config).unwrap()
}

/// A collection response body.
pub fn collection(data: Value, next: Option<String>) -> Value {
    match next {
        Some(next) => json!({"data": data, "links": {"next": next}}),
        None => json!({"data": data, "links": {}}),
    }
}

/// Gzip `text` the way segment files are delivered.
pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
