use super::error::DynamoDbError;
use super::{validate_table_name, DynamoDb};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use log::info;
use serde::{Deserialize, Serialize};

/// On-demand billing
pub const BILLING_MODE_PAY_PER_REQUEST: &str = "PAY_PER_REQUEST";
/// Provisioned capacity billing
pub const BILLING_MODE_PROVISIONED: &str = "PROVISIONED";
/// Partition key
pub const KEY_TYPE_PARTITION: &str = "HASH";
/// Sort key
pub const KEY_TYPE_SORT: &str = "RANGE";

/// Table level settings for [`DynamoDb::create_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConf {
    /// Table name
    pub table_name: String,
    /// [`BILLING_MODE_PAY_PER_REQUEST`] or [`BILLING_MODE_PROVISIONED`]
    pub billing_mode: String,
    /// Only sent with provisioned billing
    pub read_capacity_units: i64,
    /// Only sent with provisioned billing
    pub write_capacity_units: i64,
}

/// A key attribute of a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAttribute {
    /// Attribute name
    pub name: String,
    /// Scalar type: `S`, `N` or `B`
    pub attribute_type: String,
    /// [`KEY_TYPE_PARTITION`] or [`KEY_TYPE_SORT`]
    pub key_type: String,
}

impl TableAttribute {
    /// Creates a new key attribute.
    pub fn new(
        name: impl Into<String>,
        attribute_type: impl Into<String>,
        key_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
            key_type: key_type.into(),
        }
    }
}

impl DynamoDb {
    /// Creates a table keyed on `attributes`, then waits for the settle delay.
    pub async fn create_table(
        &self,
        conf: &TableConf,
        attributes: &[TableAttribute],
    ) -> Result<(), DynamoDbError> {
        validate_table_name(&conf.table_name)?;
        if conf.billing_mode.is_empty() {
            return Err(DynamoDbError::BillingModeNotProvided);
        }
        if attributes.is_empty() {
            return Err(DynamoDbError::TableAttributesNotProvided);
        }

        let mut definitions = Vec::with_capacity(attributes.len());
        let mut key_schema = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            if attribute.name.is_empty() {
                return Err(DynamoDbError::TableAttributeNameNotProvided);
            }
            if attribute.attribute_type.is_empty() {
                return Err(DynamoDbError::TableAttributeTypeNotProvided);
            }
            if attribute.key_type.is_empty() {
                return Err(DynamoDbError::KeyTypeNotProvided(attribute.name.clone()));
            }

            definitions.push(
                AttributeDefinition::builder()
                    .attribute_name(&attribute.name)
                    .attribute_type(ScalarAttributeType::from(
                        attribute.attribute_type.to_uppercase().as_str(),
                    ))
                    .build()?,
            );
            key_schema.push(
                KeySchemaElement::builder()
                    .attribute_name(&attribute.name)
                    .key_type(KeyType::from(attribute.key_type.to_uppercase().as_str()))
                    .build()?,
            );
        }

        let billing_mode = conf.billing_mode.to_uppercase();
        let throughput = if billing_mode == BILLING_MODE_PROVISIONED {
            Some(
                ProvisionedThroughput::builder()
                    .read_capacity_units(conf.read_capacity_units)
                    .write_capacity_units(conf.write_capacity_units)
                    .build()?,
            )
        } else {
            None
        };

        self.client
            .create_table()
            .table_name(&conf.table_name)
            .billing_mode(BillingMode::from(billing_mode.as_str()))
            .set_attribute_definitions(Some(definitions))
            .set_key_schema(Some(key_schema))
            .set_provisioned_throughput(throughput)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        info!("created table {}", conf.table_name);
        self.settle().await;
        Ok(())
    }

    /// Deletes the table, then waits for the settle delay.
    pub async fn delete_table(&self, table: &str) -> Result<(), DynamoDbError> {
        validate_table_name(table)?;

        self.client
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        info!("deleted table {table}");
        self.settle().await;
        Ok(())
    }
}
