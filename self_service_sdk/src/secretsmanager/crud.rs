use super::error::{validate_secret_name, SecretsError};
use super::SecretsManager;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use aws_smithy_types::Blob;
use log::{debug, info};
use std::collections::HashMap;
use uuid::Uuid;

enum SecretValue {
    String(String),
    Binary(Vec<u8>),
}

impl SecretsManager {
    /// Stores a plain string secret.
    pub async fn create_secret_string(
        &self,
        name: &str,
        description: &str,
        secret: &str,
    ) -> Result<(), SecretsError> {
        validate_secret_name(name)?;
        if secret.is_empty() {
            return Err(SecretsError::SecretStringNotProvided);
        }
        self.create_secret(name, description, SecretValue::String(secret.to_string()))
            .await
    }

    /// Stores a map of key/value pairs as a JSON object string.
    pub async fn create_secret_key_value(
        &self,
        name: &str,
        description: &str,
        secret: &HashMap<String, String>,
    ) -> Result<(), SecretsError> {
        validate_secret_name(name)?;
        if secret.is_empty() {
            return Err(SecretsError::SecretMapNotProvided);
        }
        let secret = serde_json::to_string(secret)?;
        self.create_secret(name, description, SecretValue::String(secret))
            .await
    }

    /// Stores a binary secret.
    pub async fn create_secret_binary(
        &self,
        name: &str,
        description: &str,
        secret: &[u8],
    ) -> Result<(), SecretsError> {
        validate_secret_name(name)?;
        if secret.is_empty() {
            return Err(SecretsError::SecretBinaryNotProvided);
        }
        self.create_secret(name, description, SecretValue::Binary(secret.to_vec()))
            .await
    }

    async fn create_secret(
        &self,
        name: &str,
        description: &str,
        value: SecretValue,
    ) -> Result<(), SecretsError> {
        let mut request = self
            .client
            .create_secret()
            .name(name)
            .client_request_token(Uuid::new_v4().to_string())
            .set_description((!description.is_empty()).then(|| description.to_string()));
        request = match value {
            SecretValue::String(secret) => request.secret_string(secret),
            SecretValue::Binary(secret) => request.secret_binary(Blob::new(secret)),
        };

        request
            .send()
            .await
            .map_err(aws_sdk_secretsmanager::Error::from)?;

        info!("created secret {name}");
        Ok(())
    }

    /// Schedules the secret for deletion after the default recovery window.
    pub async fn delete_secret(&self, name: &str) -> Result<(), SecretsError> {
        validate_secret_name(name)?;

        self.client
            .delete_secret()
            .secret_id(name)
            .send()
            .await
            .map_err(aws_sdk_secretsmanager::Error::from)?;

        info!("deleted secret {name}");
        Ok(())
    }

    /// Reads the current string value of the secret.
    pub async fn get_secret_string(&self, name: &str) -> Result<String, SecretsError> {
        self.get_secret_value(name)
            .await?
            .secret_string
            .ok_or_else(|| SecretsError::SecretValueNotReturned(name.to_string(), "string"))
    }

    /// Reads a secret stored by [`SecretsManager::create_secret_key_value`].
    pub async fn get_secret_key_value(
        &self,
        name: &str,
    ) -> Result<HashMap<String, String>, SecretsError> {
        let secret = self.get_secret_string(name).await?;
        Ok(serde_json::from_str(&secret)?)
    }

    /// Reads the current binary value of the secret.
    pub async fn get_secret_binary(&self, name: &str) -> Result<Vec<u8>, SecretsError> {
        self.get_secret_value(name)
            .await?
            .secret_binary
            .map(Blob::into_inner)
            .ok_or_else(|| SecretsError::SecretValueNotReturned(name.to_string(), "binary"))
    }

    async fn get_secret_value(&self, name: &str) -> Result<GetSecretValueOutput, SecretsError> {
        validate_secret_name(name)?;

        debug!("getting secret {name}");
        Ok(self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(aws_sdk_secretsmanager::Error::from)?)
    }
}
