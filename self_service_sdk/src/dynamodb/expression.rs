//! Condition, projection and update expressions for DynamoDB reads and writes.
//!
//! Key conditions and filters are built from flat lists of [`Condition`]s that
//! are ANDed together in input order. Projections are built from a list of
//! [`Field`]s. The result of a build is an [`Expression`] carrying the rendered
//! clauses together with the `#N` name and `:N` value placeholder maps.

use super::error::{ExpressionError, ExpressionKind};
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The operator codes understood by [`Condition`]. Codes are matched
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `BT`. Recognised but not translated by any expression kind.
    Between,
    /// `BW`
    BeginsWith,
    /// `CO`
    Contains,
    /// `EQ`
    Equal,
    /// `GT`
    GreaterThan,
    /// `GE`
    GreaterThanOrEqual,
    /// `IN`
    In,
    /// `LT`
    LessThan,
    /// `LE`
    LessThanOrEqual,
    /// `NE`
    NotEqual,
}

impl Operator {
    /// The two letter code for the operator.
    pub fn code(self) -> &'static str {
        match self {
            Operator::Between => "BT",
            Operator::BeginsWith => "BW",
            Operator::Contains => "CO",
            Operator::Equal => "EQ",
            Operator::GreaterThan => "GT",
            Operator::GreaterThanOrEqual => "GE",
            Operator::In => "IN",
            Operator::LessThan => "LT",
            Operator::LessThanOrEqual => "LE",
            Operator::NotEqual => "NE",
        }
    }

    /// Looks up an operator by code, ignoring case.
    pub fn from_code(code: &str) -> Option<Operator> {
        match code.to_uppercase().as_str() {
            "BT" => Some(Operator::Between),
            "BW" => Some(Operator::BeginsWith),
            "CO" => Some(Operator::Contains),
            "EQ" => Some(Operator::Equal),
            "GT" => Some(Operator::GreaterThan),
            "GE" => Some(Operator::GreaterThanOrEqual),
            "IN" => Some(Operator::In),
            "LT" => Some(Operator::LessThan),
            "LE" => Some(Operator::LessThanOrEqual),
            "NE" => Some(Operator::NotEqual),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> String {
        operator.code().to_string()
    }
}

/// One comparison used in a key condition or filter expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// The attribute to compare.
    pub field: String,
    /// The operator code, e.g. `EQ`.
    pub operator: String,
    /// The literal to compare against.
    pub value: String,
}

impl Condition {
    /// Creates a new condition.
    ///
    /// ```
    /// use self_service_sdk::dynamodb::{Condition, Operator};
    ///
    /// let condition = Condition::new("service", Operator::Equal, "123");
    /// assert_eq!(condition.operator, "EQ");
    /// ```
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// One attribute to include in a projection expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// The attribute name.
    pub name: String,
}

impl Field {
    /// Creates a new projection field.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    BeginsWith,
    Contains,
    In,
}

impl Comparator {
    fn render(self, name: &str, value: &str) -> String {
        match self {
            Comparator::Equal => format!("{name} = {value}"),
            Comparator::NotEqual => format!("{name} <> {value}"),
            Comparator::LessThan => format!("{name} < {value}"),
            Comparator::LessThanOrEqual => format!("{name} <= {value}"),
            Comparator::GreaterThan => format!("{name} > {value}"),
            Comparator::GreaterThanOrEqual => format!("{name} >= {value}"),
            Comparator::BeginsWith => format!("begins_with ({name}, {value})"),
            Comparator::Contains => format!("contains ({name}, {value})"),
            Comparator::In => format!("{name} IN ({value})"),
        }
    }
}

/// Operators usable against key attributes.
const KEY_CONDITION_OPERATORS: [(Operator, Comparator); 6] = [
    (Operator::BeginsWith, Comparator::BeginsWith),
    (Operator::Equal, Comparator::Equal),
    (Operator::GreaterThan, Comparator::GreaterThan),
    (Operator::GreaterThanOrEqual, Comparator::GreaterThanOrEqual),
    (Operator::LessThan, Comparator::LessThan),
    (Operator::LessThanOrEqual, Comparator::LessThanOrEqual),
];

/// Operators usable in post-read filters.
const FILTER_OPERATORS: [(Operator, Comparator); 9] = [
    (Operator::BeginsWith, Comparator::BeginsWith),
    (Operator::Contains, Comparator::Contains),
    (Operator::Equal, Comparator::Equal),
    (Operator::GreaterThan, Comparator::GreaterThan),
    (Operator::GreaterThanOrEqual, Comparator::GreaterThanOrEqual),
    (Operator::In, Comparator::In),
    (Operator::LessThan, Comparator::LessThan),
    (Operator::LessThanOrEqual, Comparator::LessThanOrEqual),
    (Operator::NotEqual, Comparator::NotEqual),
];

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Compare {
        comparator: Comparator,
        name: String,
        value: AttributeValue,
    },
    And(Vec<Clause>),
}

impl Clause {
    fn and(self, right: Clause) -> Clause {
        match self {
            Clause::And(mut clauses) => {
                clauses.push(right);
                Clause::And(clauses)
            }
            left => Clause::And(vec![left, right]),
        }
    }

    fn render(
        &self,
        kind: ExpressionKind,
        placeholders: &mut Placeholders,
    ) -> Result<String, ExpressionError> {
        match self {
            Clause::Compare {
                comparator,
                name,
                value,
            } => {
                let name = placeholders.name(kind, name)?;
                let value = placeholders.value(value.clone());
                Ok(comparator.render(&name, &value))
            }
            Clause::And(clauses) => Ok(clauses
                .iter()
                .map(|clause| Ok(format!("({})", clause.render(kind, placeholders)?)))
                .collect::<Result<Vec<_>, ExpressionError>>()?
                .join(" AND ")),
        }
    }
}

/// A key condition clause, used by query operations.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition(Clause);

impl KeyCondition {
    /// Combines two key conditions with a logical AND.
    pub fn and(self, right: KeyCondition) -> KeyCondition {
        KeyCondition(self.0.and(right.0))
    }
}

/// A filter clause, applied to items after they are read.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpression(Clause);

impl ConditionExpression {
    /// Combines two filters with a logical AND.
    pub fn and(self, right: ConditionExpression) -> ConditionExpression {
        ConditionExpression(self.0.and(right.0))
    }
}

/// The list of attributes a read returns. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<String>);

impl Projection {
    /// Appends another attribute to the projection.
    pub fn add_name(mut self, name: impl Into<String>) -> Projection {
        self.0.push(name.into());
        self
    }
}

/// A list of `SET` assignments for an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update(Vec<(String, AttributeValue)>);

impl Update {
    /// Adds a `SET name = value` assignment.
    pub fn set(mut self, name: impl Into<String>, value: AttributeValue) -> Update {
        self.0.push((name.into(), value));
        self
    }

    /// Whether the update has no assignments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Hands out `#N` / `:N` placeholders while clauses are rendered.
#[derive(Debug, Default)]
struct Placeholders {
    names: Vec<String>,
    values: Vec<AttributeValue>,
}

impl Placeholders {
    /// Renders a document path such as `owner.tags[0]`. Each dotted segment
    /// gets its own name placeholder and keeps its list index suffix.
    fn name(&mut self, kind: ExpressionKind, path: &str) -> Result<String, ExpressionError> {
        let mut rendered = Vec::new();
        for segment in path.split('.') {
            let (name, index) = split_segment(segment)
                .ok_or_else(|| ExpressionError::InvalidFieldName(kind, path.to_string()))?;
            let position = match self.names.iter().position(|known| known == name) {
                Some(position) => position,
                None => {
                    self.names.push(name.to_string());
                    self.names.len() - 1
                }
            };
            rendered.push(format!("#{position}{index}"));
        }

        Ok(rendered.join("."))
    }

    fn value(&mut self, value: AttributeValue) -> String {
        self.values.push(value);
        format!(":{}", self.values.len() - 1)
    }

    fn into_maps(
        self,
    ) -> (
        Option<HashMap<String, String>>,
        Option<HashMap<String, AttributeValue>>,
    ) {
        let names = (!self.names.is_empty()).then(|| {
            self.names
                .into_iter()
                .enumerate()
                .map(|(index, name)| (format!("#{index}"), name))
                .collect()
        });
        let values = (!self.values.is_empty()).then(|| {
            self.values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (format!(":{index}"), value))
                .collect()
        });
        (names, values)
    }
}

/// Splits `tags[0][1]` into `("tags", "[0][1]")`. `None` when the name part
/// is empty or the suffix is not a run of `[digits]`.
fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let (name, index) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
    if name.is_empty() || name.contains(']') {
        return None;
    }

    let mut rest = index;
    while !rest.is_empty() {
        let digits = rest.strip_prefix('[')?;
        let close = digits.find(']')?;
        if close == 0 || !digits[..close].bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest = &digits[close + 1..];
    }

    Some((name, index))
}

/// The parts of an expression a read request needs.
///
/// Query and scan accept anything implementing this trait, so callers are not
/// tied to [`Expression`].
pub trait ExpressionParts {
    /// The `#N` placeholder to attribute name map.
    fn names(&self) -> Option<&HashMap<String, String>>;
    /// The `:N` placeholder to attribute value map.
    fn values(&self) -> Option<&HashMap<String, AttributeValue>>;
    /// The rendered key condition.
    fn key_condition(&self) -> Option<&str>;
    /// The rendered filter.
    fn filter(&self) -> Option<&str>;
    /// The rendered projection.
    fn projection(&self) -> Option<&str>;
}

/// A built expression. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    names: Option<HashMap<String, String>>,
    values: Option<HashMap<String, AttributeValue>>,
    key_condition: Option<String>,
    filter: Option<String>,
    projection: Option<String>,
    update: Option<String>,
}

impl Expression {
    /// The rendered update clause, if any.
    pub fn update(&self) -> Option<&str> {
        self.update.as_deref()
    }
}

impl ExpressionParts for Expression {
    fn names(&self) -> Option<&HashMap<String, String>> {
        self.names.as_ref()
    }

    fn values(&self) -> Option<&HashMap<String, AttributeValue>> {
        self.values.as_ref()
    }

    fn key_condition(&self) -> Option<&str> {
        self.key_condition.as_deref()
    }

    fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }
}

/// Collects clauses and renders them into one [`Expression`].
#[derive(Debug, Clone, Default)]
pub struct ExpressionBuilder {
    key_condition: Option<KeyCondition>,
    filter: Option<ConditionExpression>,
    projection: Option<Projection>,
    update: Option<Update>,
}

impl ExpressionBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key condition.
    pub fn with_key_condition(mut self, key_condition: KeyCondition) -> Self {
        self.key_condition = Some(key_condition);
        self
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: ConditionExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the projection.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Sets the update.
    pub fn with_update(mut self, update: Update) -> Self {
        self.update = Some(update);
        self
    }

    /// Renders every attached clause. Placeholders are numbered across all
    /// clauses in the order key condition, filter, projection, update.
    pub fn build(self) -> Result<Expression, ExpressionError> {
        let mut placeholders = Placeholders::default();

        let key_condition = self
            .key_condition
            .map(|key_condition| {
                key_condition
                    .0
                    .render(ExpressionKind::KeyCondition, &mut placeholders)
            })
            .transpose()?;
        let filter = self
            .filter
            .map(|filter| filter.0.render(ExpressionKind::Filter, &mut placeholders))
            .transpose()?;
        let projection = match self.projection {
            Some(projection) => {
                let mut names = Vec::with_capacity(projection.0.len());
                for name in &projection.0 {
                    names.push(placeholders.name(ExpressionKind::Projection, name)?);
                }
                Some(names.join(", "))
            }
            None => None,
        };
        let update = match self.update {
            Some(update) if update.is_empty() => {
                return Err(ExpressionError::NotProvided(ExpressionKind::Update))
            }
            Some(update) => {
                let mut assignments = Vec::with_capacity(update.0.len());
                for (name, value) in update.0 {
                    let name = placeholders.name(ExpressionKind::Update, &name)?;
                    let value = placeholders.value(value);
                    assignments.push(format!("{name} = {value}"));
                }
                Some(format!("SET {}", assignments.join(", ")))
            }
            None => None,
        };

        let (names, values) = placeholders.into_maps();
        Ok(Expression {
            names,
            values,
            key_condition,
            filter,
            projection,
            update,
        })
    }
}

/// Creates an expression from optional key condition, filter and projection
/// lists.
///
/// A list is only processed when it is `Some`. An empty list is rejected, so
/// pass `None` to leave a clause out.
///
/// ```
/// use self_service_sdk::dynamodb::{new_expression, Condition, ExpressionParts};
///
/// let keys = [Condition::new("service", "EQ", "123")];
/// let expr = new_expression(Some(&keys), None, None).unwrap();
/// assert_eq!(expr.key_condition(), Some("#0 = :0"));
/// assert!(expr.filter().is_none());
/// ```
pub fn new_expression(
    keys: Option<&[Condition]>,
    filters: Option<&[Condition]>,
    projections: Option<&[Field]>,
) -> Result<Expression, ExpressionError> {
    let mut builder = ExpressionBuilder::new();

    if let Some(keys) = keys {
        builder = builder.with_key_condition(new_key_condition(keys)?);
    }
    if let Some(filters) = filters {
        builder = builder.with_filter(new_filter(filters)?);
    }
    if let Some(projections) = projections {
        builder = builder.with_projection(new_projection(projections)?);
    }

    builder.build()
}

/// ANDs the conditions together as a key condition.
pub fn new_key_condition(conditions: &[Condition]) -> Result<KeyCondition, ExpressionError> {
    fold_conditions(
        conditions,
        ExpressionKind::KeyCondition,
        &KEY_CONDITION_OPERATORS,
    )
    .map(KeyCondition)
}

/// ANDs the conditions together as a filter.
pub fn new_filter(conditions: &[Condition]) -> Result<ConditionExpression, ExpressionError> {
    fold_conditions(conditions, ExpressionKind::Filter, &FILTER_OPERATORS).map(ConditionExpression)
}

/// Builds a projection from the field names, in order.
pub fn new_projection(fields: &[Field]) -> Result<Projection, ExpressionError> {
    if fields.is_empty() {
        return Err(ExpressionError::NotProvided(ExpressionKind::Projection));
    }

    let mut names = Vec::with_capacity(fields.len());
    for field in fields {
        if field.name.is_empty() {
            return Err(ExpressionError::FieldNameRequired(
                ExpressionKind::Projection,
            ));
        }
        names.push(field.name.clone());
    }

    Ok(Projection(names))
}

fn fold_conditions(
    conditions: &[Condition],
    kind: ExpressionKind,
    operators: &[(Operator, Comparator)],
) -> Result<Clause, ExpressionError> {
    let mut folded: Option<Clause> = None;
    for condition in conditions {
        let clause = translate(condition, kind, operators)?;
        folded = Some(match folded {
            Some(running) => running.and(clause),
            None => clause,
        });
    }

    folded.ok_or(ExpressionError::NotProvided(kind))
}

fn translate(
    condition: &Condition,
    kind: ExpressionKind,
    operators: &[(Operator, Comparator)],
) -> Result<Clause, ExpressionError> {
    if condition.field.is_empty() {
        return Err(ExpressionError::FieldNameRequired(kind));
    }
    if condition.operator.is_empty() {
        return Err(ExpressionError::OperatorRequired(kind));
    }

    let comparator = Operator::from_code(&condition.operator)
        .and_then(|operator| {
            operators
                .iter()
                .find(|(supported, _)| *supported == operator)
                .map(|(_, comparator)| *comparator)
        })
        .ok_or_else(|| ExpressionError::OperatorNotSupported(kind, condition.operator.clone()))?;

    Ok(Clause::Compare {
        comparator,
        name: condition.field.clone(),
        value: AttributeValue::S(condition.value.clone()),
    })
}
