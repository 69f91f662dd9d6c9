//! Comparison operators for filter conditions.
//!
//! [`FilterOperator`] is the closed set of supported operators. Each has a
//! canonical upper-case name (`GREATER_OR_EQUAL`) and a short lower-case
//! alias (`gte`); [`FilterOperator::resolve`] accepts either, in any case.
//!
//! Comparison is a single dispatch over the pair (field value, operand)
//! rather than per-type implementations: adding a field type means adding
//! arms to [`FilterOperator::compare`].

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::condition::Operand;
use crate::error::{QueryError, Result};
use crate::value::{Scalar, Value};

/// Comparison operator for a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterOperator {
    /// Equal. Strings are compared case-insensitively unless the condition
    /// is case sensitive.
    Equals,
    /// Not equal. A null field is not equal to anything.
    NotEquals,
    /// String contains substring.
    Contains,
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Value is one of the given list.
    In,
    /// Inclusive range between two bounds.
    Between,
    /// Field is absent or null.
    IsNull,
    /// Field is present and not null.
    IsNotNull,
}

/// Shape of the value an operator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueArity {
    /// No value (`IS_NULL`, `IS_NOT_NULL`).
    None,
    /// Exactly one scalar.
    Scalar,
    /// A list of exactly two scalars (`BETWEEN`).
    Pair,
    /// A list of scalars (`IN`).
    List,
}

impl fmt::Display for ValueArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueArity::None => "no value",
            ValueArity::Scalar => "a single value",
            ValueArity::Pair => "a list of exactly two values",
            ValueArity::List => "a list of values",
        })
    }
}

impl FilterOperator {
    /// Every operator, in declaration order.
    pub const ALL: [FilterOperator; 13] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessOrEqual,
        FilterOperator::In,
        FilterOperator::Between,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    /// Returns the canonical name of this operator.
    pub fn name(self) -> &'static str {
        match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::NotEquals => "NOT_EQUALS",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterOrEqual => "GREATER_OR_EQUAL",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessOrEqual => "LESS_OR_EQUAL",
            FilterOperator::In => "IN",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::IsNotNull => "IS_NOT_NULL",
        }
    }

    /// Returns the short lower-case alias of this operator.
    pub fn alias(self) -> &'static str {
        match self {
            FilterOperator::Equals => "eq",
            FilterOperator::NotEquals => "ne",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::GreaterOrEqual => "gte",
            FilterOperator::LessThan => "lt",
            FilterOperator::LessOrEqual => "lte",
            FilterOperator::In => "in",
            FilterOperator::Between => "between",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
        }
    }

    /// Resolves a caller-supplied token.
    ///
    /// Canonical names are tried first, then aliases; both ignore case.
    ///
    /// ```
    /// use pagesift::FilterOperator;
    ///
    /// assert_eq!(FilterOperator::resolve("Contains").unwrap(), FilterOperator::Contains);
    /// assert_eq!(FilterOperator::resolve("GTE").unwrap(), FilterOperator::GreaterOrEqual);
    /// assert!(FilterOperator::resolve("like").is_err());
    /// ```
    pub fn resolve(token: &str) -> Result<FilterOperator> {
        let needle = token.trim();
        Self::ALL
            .iter()
            .find(|op| op.name().eq_ignore_ascii_case(needle))
            .or_else(|| {
                Self::ALL
                    .iter()
                    .find(|op| op.alias().eq_ignore_ascii_case(needle))
            })
            .copied()
            .ok_or_else(|| QueryError::UnknownOperator(token.to_string()))
    }

    /// Returns the value shape this operator requires.
    pub fn arity(self) -> ValueArity {
        match self {
            FilterOperator::IsNull | FilterOperator::IsNotNull => ValueArity::None,
            FilterOperator::Between => ValueArity::Pair,
            FilterOperator::In => ValueArity::List,
            _ => ValueArity::Scalar,
        }
    }

    /// Returns `true` for the substring operators, which only apply to strings.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith
        )
    }

    /// Evaluates an ordering operator given the result of comparing the
    /// field value with the operand.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            FilterOperator::Equals => ordering == Ordering::Equal,
            FilterOperator::NotEquals => ordering != Ordering::Equal,
            FilterOperator::GreaterThan => ordering == Ordering::Greater,
            FilterOperator::GreaterOrEqual => ordering != Ordering::Less,
            FilterOperator::LessThan => ordering == Ordering::Less,
            FilterOperator::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Compares a record's field value against a condition operand.
    ///
    /// Returns `None` when the field value and operand cannot be compared by
    /// this operator (a type mismatch). A null field never mismatches: it
    /// simply fails every operator except `NOT_EQUALS` and `IS_NULL`.
    pub fn compare(
        self,
        case_sensitive: bool,
        field: &Value<'_>,
        operand: Option<&Operand>,
    ) -> Option<bool> {
        match self {
            FilterOperator::IsNull => Some(field.is_none()),
            FilterOperator::IsNotNull => Some(!field.is_none()),
            FilterOperator::Equals => Some(equals(field, operand?.as_scalar()?, case_sensitive)),
            FilterOperator::NotEquals => {
                Some(!equals(field, operand?.as_scalar()?, case_sensitive))
            }
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
                let pattern = match operand?.as_scalar()? {
                    Scalar::String(p) => p,
                    _ => return None,
                };
                match field {
                    Value::None => Some(false),
                    Value::String(s) => Some(self.match_string(s, pattern, case_sensitive)),
                    _ => None,
                }
            }
            FilterOperator::GreaterThan
            | FilterOperator::GreaterOrEqual
            | FilterOperator::LessThan
            | FilterOperator::LessOrEqual => {
                if field.is_none() {
                    return Some(false);
                }
                let ordering = order(field, operand?.as_scalar()?, case_sensitive)?;
                Some(self.eval_ordering(ordering))
            }
            FilterOperator::In => {
                let list = operand?.as_list()?;
                Some(list.iter().any(|item| equals(field, item, case_sensitive)))
            }
            FilterOperator::Between => {
                let (low, high) = match operand?.as_list()? {
                    [low, high] => (low, high),
                    _ => return None,
                };
                if field.is_none() {
                    return Some(false);
                }
                let above_low = order(field, low, case_sensitive)? != Ordering::Less;
                let below_high = order(field, high, case_sensitive)? != Ordering::Greater;
                Some(above_low && below_high)
            }
        }
    }

    fn match_string(self, field: &str, pattern: &str, case_sensitive: bool) -> bool {
        let field = fold(field, case_sensitive);
        let pattern = fold(pattern, case_sensitive);
        match self {
            FilterOperator::Contains => field.contains(&*pattern),
            FilterOperator::StartsWith => field.starts_with(&*pattern),
            FilterOperator::EndsWith => field.ends_with(&*pattern),
            _ => false,
        }
    }
}

/// Lower-cases a string unless the comparison is case sensitive.
fn fold(s: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.to_lowercase())
    }
}

fn equals(field: &Value<'_>, operand: &Scalar, case_sensitive: bool) -> bool {
    match (field, operand) {
        (Value::String(a), Scalar::String(b)) => fold(a, case_sensitive) == fold(b, case_sensitive),
        (Value::Number(a), Scalar::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
        (Value::Timestamp(a), Scalar::Timestamp(b)) => a == b,
        (Value::Bool(a), Scalar::Bool(b)) => a == b,
        _ => false,
    }
}

/// Orders a field value relative to an operand; `None` if the pair has no
/// ordering (different kinds, booleans, NaN).
fn order(field: &Value<'_>, operand: &Scalar, case_sensitive: bool) -> Option<Ordering> {
    match (field, operand) {
        (Value::String(a), Scalar::String(b)) => {
            Some(fold(a, case_sensitive).cmp(&fold(b, case_sensitive)))
        }
        (Value::Number(a), Scalar::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Scalar::Timestamp(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl FromStr for FilterOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        FilterOperator::resolve(s)
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self> {
        FilterOperator::resolve(&s)
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.name().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
