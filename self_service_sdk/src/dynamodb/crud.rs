use super::attribute::{marshal_item, unmarshal_item, Item};
use super::error::DynamoDbError;
use super::expression::{ExpressionBuilder, ExpressionParts, Update};
use super::{validate_table_name, DynamoDb};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};

impl DynamoDb {
    /// Writes an item, replacing any item with the same key.
    pub async fn create_item<T>(&self, table: &str, item: &T) -> Result<(), DynamoDbError>
    where
        T: Serialize + ?Sized,
    {
        validate_table_name(table)?;
        let item = marshal_item(item)?;

        debug!("putting item into {table}");
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }

    /// Deletes the item identified by `key`.
    pub async fn delete_item<K>(&self, table: &str, key: &K) -> Result<(), DynamoDbError>
    where
        K: Serialize + ?Sized,
    {
        validate_table_name(table)?;
        let key = marshal_item(key)?;

        debug!("deleting item from {table}");
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }

    /// Returns every item matching the expression's key condition, following
    /// pages until the result set is exhausted.
    ///
    /// The filter and projection are applied when present.
    pub async fn query_items<T, E>(&self, table: &str, expr: &E) -> Result<Vec<T>, DynamoDbError>
    where
        T: DeserializeOwned,
        E: ExpressionParts + ?Sized,
    {
        validate_table_name(table)?;
        let key_condition = expr
            .key_condition()
            .ok_or(DynamoDbError::KeyConditionNotProvided)?;

        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            debug!("querying {table}");
            let output = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression(key_condition)
                .set_filter_expression(expr.filter().map(str::to_string))
                .set_projection_expression(expr.projection().map(str::to_string))
                .set_expression_attribute_names(expr.names().cloned())
                .set_expression_attribute_values(expr.values().cloned())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            for item in output.items() {
                items.push(unmarshal_item(item)?);
            }
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Returns every item in the table that passes the expression's filter.
    ///
    /// The expression must not carry a key condition. Its placeholders would be
    /// sent without anything in the scan referring to them, which the service
    /// rejects.
    pub async fn scan_items<T, E>(&self, table: &str, expr: &E) -> Result<Vec<T>, DynamoDbError>
    where
        T: DeserializeOwned,
        E: ExpressionParts + ?Sized,
    {
        validate_table_name(table)?;
        if expr.key_condition().is_some() {
            return Err(DynamoDbError::KeyConditionNotSupported);
        }

        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            debug!("scanning {table}");
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_filter_expression(expr.filter().map(str::to_string))
                .set_projection_expression(expr.projection().map(str::to_string))
                .set_expression_attribute_names(expr.names().cloned())
                .set_expression_attribute_values(expr.values().cloned())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            for item in output.items() {
                items.push(unmarshal_item(item)?);
            }
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Sets the non-null top level attributes of `update` on the item
    /// identified by `key`. Attributes that are null, or that are part of the
    /// key, are left alone.
    ///
    /// Attribute names are read as document paths, so a top level name such as
    /// `owner.name` sets `name` inside the `owner` map.
    ///
    /// Returns the attributes as they are after the update.
    pub async fn update_item<K, U>(
        &self,
        table: &str,
        key: &K,
        update: &U,
    ) -> Result<Item, DynamoDbError>
    where
        K: Serialize + ?Sized,
        U: Serialize + ?Sized,
    {
        validate_table_name(table)?;
        let key = marshal_item(key)?;

        let mut attributes: Vec<(String, AttributeValue)> = marshal_item(update)?
            .into_iter()
            .filter(|(name, value)| {
                !key.contains_key(name) && !matches!(value, AttributeValue::Null(_))
            })
            .collect();
        attributes.sort_by(|a, b| a.0.cmp(&b.0));

        let patch = attributes
            .into_iter()
            .fold(Update::default(), |patch, (name, value)| patch.set(name, value));
        let expr = ExpressionBuilder::new().with_update(patch).build()?;

        debug!("updating item in {table}");
        let output = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .set_update_expression(expr.update().map(str::to_string))
            .set_expression_attribute_names(expr.names().cloned())
            .set_expression_attribute_values(expr.values().cloned())
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(output.attributes.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::{new_expression, Condition, ExpressionError, ExpressionKind, Field};
    use aws_sdk_dynamodb::operation::{
        delete_item::DeleteItemOutput,
        put_item::{PutItemError, PutItemOutput},
        query::QueryOutput,
        scan::ScanOutput,
        update_item::UpdateItemOutput,
    };
    use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Service {
        service: String,
        title: String,
    }

    #[derive(Debug, Serialize)]
    struct ServicePatch {
        service: String,
        title: Option<String>,
        owner: Option<String>,
    }

    fn row(service: &str, title: &str) -> Item {
        Item::from([
            ("service".to_string(), AttributeValue::S(service.into())),
            ("title".to_string(), AttributeValue::S(title.into())),
        ])
    }

    fn key(service: &str) -> HashMap<&'static str, String> {
        HashMap::from([("service", service.to_string())])
    }

    #[tokio::test]
    async fn test_create_item() {
        let put = mock!(aws_sdk_dynamodb::Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some("services")
                    && req.item().map(|item| item["title"] == AttributeValue::S("web".into()))
                        == Some(true)
            })
            .then_output(|| PutItemOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&put]));

        db.create_item(
            "services",
            &Service {
                service: "123".into(),
                title: "web".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(put.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_item_validation() {
        let put = mock!(aws_sdk_dynamodb::Client::put_item)
            .then_output(|| PutItemOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&put]));

        assert!(matches!(
            db.create_item("", &key("123")).await,
            Err(DynamoDbError::TableNameNotProvided)
        ));
        assert!(matches!(
            db.create_item("services", &42).await,
            Err(DynamoDbError::UnexpectedDataType(_))
        ));
        assert_eq!(put.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_item_missing_table() {
        let put = mock!(aws_sdk_dynamodb::Client::put_item).then_error(|| {
            PutItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&put]));

        let err = db.create_item("missing", &key("123")).await.unwrap_err();
        assert!(err.is_resource_not_found());
    }

    #[tokio::test]
    async fn test_delete_item() {
        let delete = mock!(aws_sdk_dynamodb::Client::delete_item)
            .match_requests(|req| {
                req.table_name() == Some("services")
                    && req.key().map(|key| key["service"] == AttributeValue::S("123".into()))
                        == Some(true)
            })
            .then_output(|| DeleteItemOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&delete]));

        db.delete_item("services", &key("123")).await.unwrap();
        assert_eq!(delete.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_query_items_follows_pages() {
        let first = mock!(aws_sdk_dynamodb::Client::query)
            .match_requests(|req| {
                req.exclusive_start_key().is_none()
                    && req.key_condition_expression() == Some("#0 = :0")
                    && req.filter_expression() == Some("contains (#1, :1)")
                    && req.projection_expression() == Some("#0, #1")
            })
            .then_output(|| {
                QueryOutput::builder()
                    .items(row("123", "web"))
                    .last_evaluated_key("service", AttributeValue::S("123".into()))
                    .build()
            });
        let second = mock!(aws_sdk_dynamodb::Client::query)
            .match_requests(|req| req.exclusive_start_key().is_some())
            .then_output(|| QueryOutput::builder().items(row("123", "webapp")).build());
        let db = DynamoDb::new(mock_client!(
            aws_sdk_dynamodb,
            RuleMode::MatchAny,
            [&first, &second]
        ));

        let expr = new_expression(
            Some(&[Condition::new("service", "EQ", "123")]),
            Some(&[Condition::new("title", "CO", "web")]),
            Some(&[Field::new("service"), Field::new("title")]),
        )
        .unwrap();
        let services: Vec<Service> = db.query_items("services", &expr).await.unwrap();

        assert_eq!(services.len(), 2);
        assert_eq!(services[1].title, "webapp");
        assert_eq!(first.num_calls(), 1);
        assert_eq!(second.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_query_items_requires_key_condition() {
        let query = mock!(aws_sdk_dynamodb::Client::query)
            .then_output(|| QueryOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&query]));

        let expr = new_expression(None, Some(&[Condition::new("title", "EQ", "web")]), None)
            .unwrap();
        let result = db.query_items::<Service, _>("services", &expr).await;
        assert!(matches!(result, Err(DynamoDbError::KeyConditionNotProvided)));
        assert_eq!(query.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_scan_items_without_expression() {
        let scan = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| {
                req.filter_expression().is_none() && req.expression_attribute_names().is_none()
            })
            .then_output(|| {
                ScanOutput::builder()
                    .items(row("1", "a"))
                    .items(row("2", "b"))
                    .build()
            });
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&scan]));

        let services: Vec<Service> = db
            .scan_items("services", &ExpressionBuilder::new().build().unwrap())
            .await
            .unwrap();
        assert_eq!(
            services.iter().map(|s| s.service.as_str()).collect::<Vec<_>>(),
            ["1", "2"]
        );
    }

    #[tokio::test]
    async fn test_scan_items_with_filter() {
        let scan = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| {
                req.filter_expression() == Some("#0 <> :0")
                    && req.expression_attribute_values().map(|values| values.len()) == Some(1)
            })
            .then_output(|| ScanOutput::builder().items(row("1", "a")).build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&scan]));

        let expr = new_expression(None, Some(&[Condition::new("title", "NE", "b")]), None)
            .unwrap();
        let services: Vec<Service> = db.scan_items("services", &expr).await.unwrap();
        assert_eq!(services.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_items_rejects_key_condition() {
        let scan = mock!(aws_sdk_dynamodb::Client::scan)
            .then_output(|| ScanOutput::builder().items(row("1", "a")).build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&scan]));

        let expr = new_expression(
            Some(&[Condition::new("service", "EQ", "123")]),
            Some(&[Condition::new("title", "NE", "b")]),
            None,
        )
        .unwrap();
        let result = db.scan_items::<Service, _>("services", &expr).await;
        assert!(matches!(
            result,
            Err(DynamoDbError::KeyConditionNotSupported)
        ));
        assert_eq!(scan.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_scan_items_sends_only_filter_placeholders() {
        let scan = mock!(aws_sdk_dynamodb::Client::scan)
            .match_requests(|req| {
                req.filter_expression() == Some("#0 = :0")
                    && req.projection_expression() == Some("#0, #1")
                    && req.expression_attribute_names().map(|names| names.len()) == Some(2)
                    && req.expression_attribute_values().map(|values| values.len()) == Some(1)
            })
            .then_output(|| ScanOutput::builder().items(row("1", "a")).build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&scan]));

        let expr = new_expression(
            None,
            Some(&[Condition::new("title", "EQ", "a")]),
            Some(&[Field::new("title"), Field::new("service")]),
        )
        .unwrap();
        let services: Vec<Service> = db.scan_items("services", &expr).await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(scan.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_item_dotted_name_is_a_path() {
        let update = mock!(aws_sdk_dynamodb::Client::update_item)
            .match_requests(|req| {
                req.update_expression() == Some("SET #0.#1 = :0")
                    && req.expression_attribute_names()
                        == Some(&HashMap::from([
                            ("#0".to_string(), "owner".to_string()),
                            ("#1".to_string(), "name".to_string()),
                        ]))
            })
            .then_output(|| UpdateItemOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&update]));

        db.update_item(
            "services",
            &key("123"),
            &serde_json::json!({ "service": "123", "owner.name": "ops" }),
        )
        .await
        .unwrap();
        assert_eq!(update.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_item_is_sparse() {
        let update = mock!(aws_sdk_dynamodb::Client::update_item)
            .match_requests(|req| {
                req.update_expression() == Some("SET #0 = :0")
                    && req.expression_attribute_names().map(|names| names["#0"].as_str())
                        == Some("title")
                    && req.return_values() == Some(&ReturnValue::UpdatedNew)
            })
            .then_output(|| {
                UpdateItemOutput::builder()
                    .attributes("title", AttributeValue::S("api".into()))
                    .build()
            });
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&update]));

        let attributes = db
            .update_item(
                "services",
                &key("123"),
                &ServicePatch {
                    service: "123".into(),
                    title: Some("api".into()),
                    owner: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(attributes["title"], AttributeValue::S("api".into()));
        assert_eq!(update.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_item_with_nothing_to_set() {
        let update = mock!(aws_sdk_dynamodb::Client::update_item)
            .then_output(|| UpdateItemOutput::builder().build());
        let db = DynamoDb::new(mock_client!(aws_sdk_dynamodb, [&update]));

        let result = db
            .update_item(
                "services",
                &key("123"),
                &ServicePatch {
                    service: "123".into(),
                    title: None,
                    owner: None,
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(DynamoDbError::Expression(ExpressionError::NotProvided(
                ExpressionKind::Update
            )))
        ));
        assert_eq!(update.num_calls(), 0);
    }
}
