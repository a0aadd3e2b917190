use super::error::DynamoDbError;
use super::{validate_table_name, DynamoDb};
use aws_sdk_dynamodb::operation::describe_table::DescribeTableOutput;
use log::debug;

impl DynamoDb {
    /// Describes the table.
    pub async fn get_table_details(&self, table: &str) -> Result<DescribeTableOutput, DynamoDbError> {
        validate_table_name(table)?;

        debug!("describing table {table}");
        Ok(self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?)
    }

    /// The table's ARN.
    pub async fn get_table_arn(&self, table: &str) -> Result<String, DynamoDbError> {
        self.get_table_details(table)
            .await?
            .table
            .and_then(|description| description.table_arn)
            .ok_or(DynamoDbError::TableDetailsNotReturned)
    }

    /// The approximate number of items in the table. DynamoDB refreshes this
    /// value about every six hours.
    pub async fn get_table_item_count(&self, table: &str) -> Result<i64, DynamoDbError> {
        self.get_table_details(table)
            .await?
            .table
            .and_then(|description| description.item_count)
            .ok_or(DynamoDbError::TableDetailsNotReturned)
    }

    /// Names of every table in the account and region.
    pub async fn get_table_list(&self) -> Result<Vec<String>, DynamoDbError> {
        let mut tables = Vec::new();
        let mut start_table: Option<String> = None;
        loop {
            let output = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(start_table.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            tables.extend(output.table_names().iter().cloned());
            match output.last_evaluated_table_name {
                Some(name) => start_table = Some(name),
                None => break,
            }
        }

        Ok(tables)
    }

    /// Whether the table exists. A missing table is not an error.
    pub async fn table_exists(&self, table: &str) -> Result<bool, DynamoDbError> {
        match self.get_table_details(table).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_resource_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
