//! Conversion between JSON values and DynamoDB attribute values.

use super::error::DynamoDbError;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// A DynamoDB item, keyed by attribute name.
pub type Item = HashMap<String, AttributeValue>;

/// Converts a JSON value into an attribute value.
///
/// Numbers keep their textual form, arrays become lists and objects become maps.
pub fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => {
            AttributeValue::L(values.into_iter().map(to_attribute_value).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| (k, to_attribute_value(v)))
                .collect(),
        ),
    }
}

/// Converts an attribute value back into JSON.
///
/// Sets become arrays and binary values become base64 strings.
pub fn from_attribute_value(value: &AttributeValue) -> Result<Value, DynamoDbError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(from_attribute_value)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(from_map(map)?),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::B(blob) => Value::String(aws_smithy_types::base64::encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(aws_smithy_types::base64::encode(blob.as_ref())))
                .collect(),
        ),
        other => return Err(DynamoDbError::UnsupportedAttributeValue(format!("{other:?}"))),
    })
}

/// Serializes a value into an item. The value must serialize to a JSON object.
pub fn marshal_item<T: Serialize + ?Sized>(item: &T) -> Result<Item, DynamoDbError> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, to_attribute_value(v)))
            .collect()),
        _ => Err(DynamoDbError::UnexpectedDataType("object")),
    }
}

/// Deserializes an item into `T`.
pub fn unmarshal_item<T: DeserializeOwned>(item: &Item) -> Result<T, DynamoDbError> {
    Ok(serde_json::from_value(Value::Object(from_map(item)?))?)
}

fn from_map(map: &HashMap<String, AttributeValue>) -> Result<Map<String, Value>, DynamoDbError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), from_attribute_value(v)?)))
        .collect()
}

fn parse_number(n: &str) -> Result<Number, DynamoDbError> {
    Ok(serde_json::from_str::<Number>(n)?)
}
