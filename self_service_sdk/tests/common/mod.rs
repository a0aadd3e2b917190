//! Helpers for tests that run against a real AWS account.
//!
//! These tests are ignored by default. Run them with
//! `TESTING_AWS_ENABLED=true cargo test -- --ignored`, with credentials
//! available through the default provider chain.

#![allow(dead_code)]

use self_service_sdk::{new_session_with_options, Session, SessionOptions};
use std::env;

const TESTING_AWS_ENABLED: &str = "TESTING_AWS_ENABLED";
const TESTING_AWS_DEFAULT_REGION: &str = "TESTING_AWS_DEFAULT_REGION";
const TESTING_AWS_ENDPOINT_URL: &str = "TESTING_AWS_ENDPOINT_URL";

pub const TEST_TABLE_NAME: &str = "self_service_sdk_testing";
pub const TEST_SECRET_NAME: &str = "self_service_sdk_testing";

/// Whether live AWS tests were asked for.
pub fn aws_tests_enabled() -> bool {
    env::var(TESTING_AWS_ENABLED)
        .map(|enabled| enabled.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// A session for the account under test.
pub async fn test_session() -> Session {
    new_session_with_options(&SessionOptions {
        region: Some(env::var(TESTING_AWS_DEFAULT_REGION).unwrap_or_else(|_| "us-east-1".into())),
        endpoint_url: env::var(TESTING_AWS_ENDPOINT_URL).ok(),
        ..Default::default()
    })
    .await
}
