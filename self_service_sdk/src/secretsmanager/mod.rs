//! Secrets Manager helpers.

mod crud;
mod error;
mod metadata;

pub use error::SecretsError;

use crate::auth::Session;
use crate::utils::SdkUserAgentInterceptor;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;

/// Secrets Manager client wrapper.
#[derive(Debug, Clone)]
pub struct SecretsManager {
    client: SecretsManagerClient,
}

impl SecretsManager {
    /// Wraps an existing client.
    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }

    /// Builds a client from the session.
    pub fn from_session(session: &Session) -> Self {
        Self::new(SecretsManagerClient::from_conf(
            aws_sdk_secretsmanager::config::Builder::from(session)
                .interceptor(SdkUserAgentInterceptor)
                .build(),
        ))
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &SecretsManagerClient {
        &self.client
    }
}
