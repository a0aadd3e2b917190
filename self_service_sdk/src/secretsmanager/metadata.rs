use super::error::{validate_secret_name, SecretsError};
use super::SecretsManager;
use aws_sdk_secretsmanager::operation::describe_secret::DescribeSecretOutput;
use log::debug;

impl SecretsManager {
    /// Describes the secret without reading its value.
    pub async fn describe_secret(&self, name: &str) -> Result<DescribeSecretOutput, SecretsError> {
        validate_secret_name(name)?;

        debug!("describing secret {name}");
        Ok(self
            .client
            .describe_secret()
            .secret_id(name)
            .send()
            .await
            .map_err(aws_sdk_secretsmanager::Error::from)?)
    }

    /// The secret's ARN.
    pub async fn get_secret_arn(&self, name: &str) -> Result<String, SecretsError> {
        self.describe_secret(name)
            .await?
            .arn
            .ok_or(SecretsError::ArnNotReturned)
    }

    /// Whether the secret exists. A missing secret is not an error.
    pub async fn secret_exists(&self, name: &str) -> Result<bool, SecretsError> {
        match self.describe_secret(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_resource_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_secretsmanager::operation::describe_secret::DescribeSecretError;
    use aws_sdk_secretsmanager::types::error::{InternalServiceError, ResourceNotFoundException};
    use aws_smithy_mocks::{mock, mock_client, RuleMode};

    const ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:service-AbCdEf";

    #[tokio::test]
    async fn test_describe_and_arn() {
        let describe = mock!(aws_sdk_secretsmanager::Client::describe_secret)
            .match_requests(|req| req.secret_id() == Some("service"))
            .then_output(|| {
                DescribeSecretOutput::builder()
                    .name("service")
                    .arn(ARN)
                    .description("test secret")
                    .build()
            });
        let secrets = SecretsManager::new(mock_client!(
            aws_sdk_secretsmanager,
            RuleMode::MatchAny,
            [&describe]
        ));

        let details = secrets.describe_secret("service").await.unwrap();
        assert_eq!(details.description(), Some("test secret"));
        assert_eq!(secrets.get_secret_arn("service").await.unwrap(), ARN);
        assert_eq!(describe.num_calls(), 2);
    }

    #[tokio::test]
    async fn test_arn_not_returned() {
        let describe = mock!(aws_sdk_secretsmanager::Client::describe_secret)
            .then_output(|| DescribeSecretOutput::builder().name("service").build());
        let secrets = SecretsManager::new(mock_client!(aws_sdk_secretsmanager, [&describe]));

        assert!(matches!(
            secrets.get_secret_arn("service").await,
            Err(SecretsError::ArnNotReturned)
        ));
    }

    #[tokio::test]
    async fn test_secret_exists() {
        let found = mock!(aws_sdk_secretsmanager::Client::describe_secret)
            .match_requests(|req| req.secret_id() == Some("service"))
            .then_output(|| DescribeSecretOutput::builder().name("service").arn(ARN).build());
        let missing = mock!(aws_sdk_secretsmanager::Client::describe_secret)
            .match_requests(|req| req.secret_id() == Some("Fred"))
            .then_error(|| {
                DescribeSecretError::ResourceNotFoundException(
                    ResourceNotFoundException::builder().build(),
                )
            });
        let broken = mock!(aws_sdk_secretsmanager::Client::describe_secret)
            .match_requests(|req| req.secret_id() == Some("broken"))
            .then_error(|| {
                DescribeSecretError::InternalServiceError(InternalServiceError::builder().build())
            });
        let secrets = SecretsManager::new(mock_client!(
            aws_sdk_secretsmanager,
            RuleMode::MatchAny,
            [&found, &missing, &broken]
        ));

        assert!(secrets.secret_exists("service").await.unwrap());
        assert!(!secrets.secret_exists("Fred").await.unwrap());
        assert!(secrets.secret_exists("broken").await.is_err());
        assert!(matches!(
            secrets.secret_exists("").await,
            Err(SecretsError::SecretNameNotProvided)
        ));
    }
}
