#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs
)]

//! Self-service SDK
//!
//! Convenience wrappers over the AWS SDK for services that keep their data in
//! DynamoDB and their credentials in Secrets Manager, plus the configuration
//! and logging helpers those services share.
//!
//! ```no_run
//! use self_service_sdk::auth::new_session;
//! use self_service_sdk::dynamodb::{new_expression, Condition, DynamoDb};
//! use serde_json::Value;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = new_session().await;
//! let db = DynamoDb::from_session(&session);
//!
//! let keys = [Condition::new("service", "EQ", "123")];
//! let expr = new_expression(Some(&keys), None, None)?;
//! let items: Vec<Value> = db.query_items("services", &expr).await?;
//! # Ok(())
//! # }
//! ```

/// Sessions and credential validation
pub mod auth;
/// Layered configuration
pub mod configutil;
/// DynamoDB expressions, items, tables and metadata
pub mod dynamodb;
/// Logger set up
pub mod logutil;
/// Secrets Manager secrets and metadata
pub mod secretsmanager;
mod utils;

pub use auth::{new_session, new_session_with_options, validate_session, Session, SessionOptions};
pub use dynamodb::DynamoDb;
pub use secretsmanager::SecretsManager;
