//! Filter conditions: the leaves of every filter tree.
//!
//! A [`FilterCondition`] names a field, an operator and an [`Operand`]. The
//! operand is owned so conditions can be stored, cloned and sent across
//! threads independently of any record.

use serde::{Deserialize, Serialize};

use crate::op::{FilterOperator, ValueArity};
use crate::value::{FieldType, Number, Scalar, Timestamp};

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use pagesift::{FilterCondition, FilterOperator};
///
/// let heavy = FilterCondition::new("weight", FilterOperator::GreaterThan, 5);
/// let named = FilterCondition::new("name", FilterOperator::Equals, "Box").case_sensitive(true);
/// let unset = FilterCondition::unary("deliveredAt", FilterOperator::IsNull);
/// # let _ = (heavy, named, unset);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Caller-assigned identifier, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub operator: FilterOperator,
    /// The value to compare against; absent for null checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Operand>,
    /// Compare strings exactly instead of case-insensitively.
    #[serde(default)]
    pub case_sensitive: bool,
}

impl FilterCondition {
    /// Creates a condition with a value.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Operand>,
    ) -> Self {
        FilterCondition {
            id: None,
            field: field.into(),
            operator,
            value: Some(value.into()),
            case_sensitive: false,
        }
    }

    /// Creates a condition without a value (`IS_NULL`, `IS_NOT_NULL`).
    pub fn unary(field: impl Into<String>, operator: FilterOperator) -> Self {
        FilterCondition {
            id: None,
            field: field.into(),
            operator,
            value: None,
            case_sensitive: false,
        }
    }

    /// Sets the caller-assigned identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets case sensitivity for string comparisons.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// Owned value of a filter condition.
///
/// On the wire a scalar is a JSON string, number or boolean and a list is a
/// JSON array of those. Nested arrays, objects and nulls inside a list are
/// rejected when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Operand {
    /// A single value.
    Scalar(Scalar),
    /// A list of values (`IN`, `BETWEEN`).
    List(Vec<Scalar>),
}

impl Operand {
    /// Returns the single value, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Operand::Scalar(s) => Some(s),
            Operand::List(_) => None,
        }
    }

    /// Returns the values, if this is a list.
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Operand::List(items) => Some(items),
            Operand::Scalar(_) => None,
        }
    }

    /// Returns `true` if this operand has the given shape.
    pub fn has_arity(&self, arity: ValueArity) -> bool {
        match (arity, self) {
            (ValueArity::Scalar, Operand::Scalar(_)) => true,
            (ValueArity::Pair, Operand::List(items)) => items.len() == 2,
            (ValueArity::List, Operand::List(_)) => true,
            _ => false,
        }
    }

    /// Converts every string value to the declared field type.
    pub fn coerce(self, declared: Option<FieldType>) -> Result<Operand, String> {
        match self {
            Operand::Scalar(s) => s.coerce(declared).map(Operand::Scalar),
            Operand::List(items) => items
                .into_iter()
                .map(|s| s.coerce(declared))
                .collect::<Result<Vec<_>, _>>()
                .map(Operand::List),
        }
    }
}

impl TryFrom<serde_json::Value> for Operand {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| {
                    let shown = item.to_string();
                    Scalar::from_json(item)
                        .ok_or_else(|| format!("list values must be scalars, got {shown}"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Operand::List),
            other => {
                let shown = other.to_string();
                Scalar::from_json(other).map(Operand::Scalar).ok_or_else(|| {
                    format!("expected a string, number, boolean or list, got {shown}")
                })
            }
        }
    }
}

impl From<Operand> for serde_json::Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Scalar(s) => s.to_json(),
            Operand::List(items) => {
                serde_json::Value::Array(items.iter().map(Scalar::to_json).collect())
            }
        }
    }
}

macro_rules! operand_from_scalar {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Operand {
                fn from(value: $source) -> Self {
                    Operand::Scalar(value.into())
                }
            }
        )*
    };
}

operand_from_scalar!(
    Scalar, &str, String, bool, Number, Timestamp, i8, i16, i32, i64, isize, u8, u16, u32, u64,
    usize, f32, f64
);

impl<T: Into<Scalar>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for Operand {
    fn from(values: [T; N]) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

/// Range bounds for `BETWEEN`.
impl<A: Into<Scalar>, B: Into<Scalar>> From<(A, B)> for Operand {
    fn from((low, high): (A, B)) -> Self {
        Operand::List(vec![low.into(), high.into()])
    }
}
