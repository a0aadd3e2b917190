//! DynamoDB helpers: the expression builder, item CRUD, table DDL and table
//! metadata.

mod attribute;
mod crud;
mod ddl;
mod error;
mod expression;
mod metadata;

pub use attribute::{from_attribute_value, marshal_item, to_attribute_value, unmarshal_item, Item};
pub use ddl::{
    TableAttribute, TableConf, BILLING_MODE_PAY_PER_REQUEST, BILLING_MODE_PROVISIONED,
    KEY_TYPE_PARTITION, KEY_TYPE_SORT,
};
pub use error::{DynamoDbError, ExpressionError, ExpressionKind};
pub use expression::{
    new_expression, new_filter, new_key_condition, new_projection, Condition,
    ConditionExpression, Expression, ExpressionBuilder, ExpressionParts, Field, KeyCondition,
    Operator, Projection, Update,
};

use crate::auth::Session;
use crate::utils::SdkUserAgentInterceptor;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::time::Duration;

/// Time given to the service to finish a table change before returning.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// DynamoDB client wrapper.
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: DynamoDbClient,
    settle_delay: Duration,
}

impl DynamoDb {
    /// Wraps an existing client.
    pub fn new(client: DynamoDbClient) -> Self {
        Self {
            client,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Builds a client from the session.
    pub fn from_session(session: &Session) -> Self {
        Self::new(DynamoDbClient::from_conf(
            aws_sdk_dynamodb::config::Builder::from(session)
                .interceptor(SdkUserAgentInterceptor)
                .build(),
        ))
    }

    /// Sets how long table creation and deletion wait after a successful call.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

fn validate_table_name(table: &str) -> Result<(), DynamoDbError> {
    if table.is_empty() {
        return Err(DynamoDbError::TableNameNotProvided);
    }
    Ok(())
}
