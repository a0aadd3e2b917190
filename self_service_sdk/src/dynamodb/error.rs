use std::fmt;

/// The kind of expression a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Key condition of a query
    KeyCondition,
    /// Post-read filter
    Filter,
    /// Projection of returned attributes
    Projection,
    /// `SET` update
    Update,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpressionKind::KeyCondition => "key condition",
            ExpressionKind::Filter => "filter",
            ExpressionKind::Projection => "projection",
            ExpressionKind::Update => "update",
        })
    }
}

/// Errors raised while building an expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A condition or projection field has an empty name
    #[error("field name required for {0} expressions")]
    FieldNameRequired(ExpressionKind),

    /// A field path has an empty segment or a malformed list index
    #[error("invalid field name in {0} expressions: {1}")]
    InvalidFieldName(ExpressionKind, String),

    /// A condition has an empty operator
    #[error("operator required for {0} expressions")]
    OperatorRequired(ExpressionKind),

    /// The operator code is unknown or not valid for this kind of expression
    #[error("operator not supported by {0} expressions: {1}")]
    OperatorNotSupported(ExpressionKind, String),

    /// A list was supplied but it was empty
    #[error("no {0} expression provided")]
    NotProvided(ExpressionKind),
}

/// All possible datastore errors
#[derive(thiserror::Error, Debug)]
pub enum DynamoDbError {
    /// Empty table name
    #[error("table name not provided")]
    TableNameNotProvided,

    /// Empty billing mode
    #[error("billing mode not provided")]
    BillingModeNotProvided,

    /// No attributes passed to create table
    #[error("table attributes not provided")]
    TableAttributesNotProvided,

    /// A table attribute has an empty name
    #[error("table attribute name not provided")]
    TableAttributeNameNotProvided,

    /// A table attribute has an empty type
    #[error("table attribute type not provided")]
    TableAttributeTypeNotProvided,

    /// A table attribute has an empty key type
    #[error("key type not provided for table attribute {0}")]
    KeyTypeNotProvided(String),

    /// The service answered without a table description
    #[error("table details not returned")]
    TableDetailsNotReturned,

    /// Query called without a key condition
    #[error("key condition expression not provided")]
    KeyConditionNotProvided,

    /// Scan called with a key condition
    #[error("key condition expression not supported by scan")]
    KeyConditionNotSupported,

    /// Input did not have the expected shape
    #[error("unexpected data type, expected {0}")]
    UnexpectedDataType(&'static str),

    /// An attribute value that has no JSON counterpart
    #[error("unsupported attribute value: {0}")]
    UnsupportedAttributeValue(String),

    /// Invalid expression
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Item could not be converted to or from JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A request type could not be built
    #[error("request build error: {0}")]
    Build(#[from] aws_smithy_types::error::operation::BuildError),

    /// The service call failed
    #[error("dynamodb error: {0}")]
    Service(#[from] aws_sdk_dynamodb::Error),
}

impl DynamoDbError {
    /// Whether the error is the service reporting a missing table.
    pub fn is_resource_not_found(&self) -> bool {
        matches!(
            self,
            DynamoDbError::Service(aws_sdk_dynamodb::Error::ResourceNotFoundException(_))
        )
    }
}
