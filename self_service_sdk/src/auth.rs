//! Sessions shared by every service client in this crate.

use crate::utils::SdkUserAgentInterceptor;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_sts::Client as StsClient;
use log::debug;
use std::fmt;

/// A loaded AWS configuration. Service wrappers build their clients from it.
pub type Session = SdkConfig;

/// Errors raised while validating a session.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// STS answered without an account
    #[error("caller identity not returned")]
    IdentityNotReturned,

    /// The STS call failed
    #[error("sts error: {0}")]
    Service(#[from] aws_sdk_sts::Error),
}

/// Static access keys, used instead of the default provider chain.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Overrides applied on top of the default configuration chain.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Region, e.g. `us-east-1`
    pub region: Option<String>,
    /// Named profile from the shared config files
    pub profile: Option<String>,
    /// Custom endpoint, e.g. a local DynamoDB
    pub endpoint_url: Option<String>,
    /// Static credentials
    pub credentials: Option<StaticCredentials>,
}

/// Identity of the principal a session signs requests as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Account id
    pub account: String,
    /// Principal ARN
    pub arn: String,
    /// Unique id of the principal
    pub user_id: String,
}

/// Loads a session from the default environment, profile and instance chain.
pub async fn new_session() -> Session {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}

/// Loads a session from the default chain with the given overrides applied.
pub async fn new_session_with_options(options: &SessionOptions) -> Session {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &options.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint_url) = &options.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    if let Some(credentials) = &options.credentials {
        loader = loader.credentials_provider(Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            credentials.session_token.clone(),
            None,
            "self-service-sdk",
        ));
    }

    loader.load().await
}

/// Checks that the session can sign requests by asking STS who it belongs to.
pub async fn validate_session(session: &Session) -> Result<CallerIdentity, AuthError> {
    let client = StsClient::from_conf(
        aws_sdk_sts::config::Builder::from(session)
            .interceptor(SdkUserAgentInterceptor)
            .build(),
    );
    caller_identity(&client).await
}

async fn caller_identity(client: &StsClient) -> Result<CallerIdentity, AuthError> {
    debug!("validating session with sts");
    let output = client
        .get_caller_identity()
        .send()
        .await
        .map_err(aws_sdk_sts::Error::from)?;

    Ok(CallerIdentity {
        account: output.account.ok_or(AuthError::IdentityNotReturned)?,
        arn: output.arn.unwrap_or_default(),
        user_id: output.user_id.unwrap_or_default(),
    })
}
