/// All possible secret store errors
#[derive(thiserror::Error, Debug)]
pub enum SecretsError {
    /// Empty secret name
    #[error("a secret name must be provided")]
    SecretNameNotProvided,

    /// Empty key/value map
    #[error("at least one secret key/value pair must be provided")]
    SecretMapNotProvided,

    /// Empty secret string
    #[error("a secret string must be provided")]
    SecretStringNotProvided,

    /// Empty secret binary
    #[error("a secret binary must be provided")]
    SecretBinaryNotProvided,

    /// The secret holds no value of the requested kind
    #[error("secret {0} has no {1} value")]
    SecretValueNotReturned(String, &'static str),

    /// The service answered without an ARN
    #[error("secret ARN not returned")]
    ArnNotReturned,

    /// A key/value secret is not a JSON object of strings
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service call failed
    #[error("secrets manager error: {0}")]
    Service(#[from] aws_sdk_secretsmanager::Error),
}

impl SecretsError {
    /// Whether the error is the service reporting a missing secret.
    pub fn is_resource_not_found(&self) -> bool {
        matches!(
            self,
            SecretsError::Service(aws_sdk_secretsmanager::Error::ResourceNotFoundException(_))
        )
    }
}

pub(crate) fn validate_secret_name(name: &str) -> Result<(), SecretsError> {
    if name.is_empty() {
        return Err(SecretsError::SecretNameNotProvided);
    }
    Ok(())
}
