//! Runtime value types for field comparison.
//!
//! [`Value`] is what a record hands out for one of its fields, borrowed from
//! the record. [`Scalar`] is the owned counterpart stored in filter
//! conditions. [`FieldType`] is the declared type of a field and drives the
//! coercion table used when a record stores a field as text (JSON sources
//! usually carry timestamps as strings).

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use pagesift::{Number, Record, Value};
///
/// struct Parcel {
///     status: String,
///     weight: u32,
/// }
///
/// impl Record for Parcel {
///     fn field(&self, name: &str) -> Value<'_> {
///         match name {
///             "status" => Value::String(&self.status),
///             "weight" => Value::Number(Number::from(self.weight)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or unsupported.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts this value to the declared field type when the record
    /// stores it in another representation.
    ///
    /// Values that cannot be converted are returned unchanged; comparing
    /// them later reports a type mismatch.
    pub fn coerce(self, declared: Option<FieldType>) -> Value<'a> {
        match (declared, self) {
            (Some(FieldType::Timestamp), Value::String(s)) => Timestamp::parse(s)
                .map(Value::Timestamp)
                .unwrap_or(Value::String(s)),
            (Some(FieldType::Timestamp), Value::Number(n)) => n
                .as_i64()
                .map(|ms| Value::Timestamp(Timestamp(ms)))
                .unwrap_or(Value::Number(n)),
            (Some(FieldType::Number), Value::String(s)) => Number::parse(s)
                .map(Value::Number)
                .unwrap_or(Value::String(s)),
            (Some(FieldType::Bool), Value::String(s)) => {
                parse_bool(s).map(Value::Bool).unwrap_or(Value::String(s))
            }
            (_, value) => value,
        }
    }
}

/// Declared type of a record field.
///
/// Record sources declare one type per queryable field in a
/// [`Schema`](crate::Schema). Comparison semantics follow the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "temporal", alias = "datetime")]
    Timestamp,
}

impl FieldType {
    /// Returns the display name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns the number as an `i64` if it is an integer that fits.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(n),
            Number::U64(n) => i64::try_from(n).ok(),
            Number::F64(_) => None,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting: exact across integer and float
    /// variants, with NaN after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::F64(a), Number::F64(b)) => match (a.is_nan(), b.is_nan()) {
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                (a_nan, b_nan) => a_nan.cmp(&b_nan),
            },
            (Number::F64(a), int) => int_float_cmp(int.as_i128(), a).reverse(),
            (int, Number::F64(b)) => int_float_cmp(int.as_i128(), b),
            (a, b) => a.as_i128().cmp(&b.as_i128()),
        }
    }

    fn as_i128(self) -> i128 {
        match self {
            Number::I64(n) => i128::from(n),
            Number::U64(n) => i128::from(n),
            Number::F64(n) => n as i128,
        }
    }

    /// Parses an integer or floating point literal.
    pub fn parse(s: &str) -> Option<Number> {
        let s = s.trim();
        s.parse::<i64>()
            .map(Number::I64)
            .or_else(|_| s.parse::<u64>().map(Number::U64))
            .or_else(|_| s.parse::<f64>().map(Number::F64))
            .ok()
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

/// Orders an integer against a float without going through `f64`.
fn int_float_cmp(int: i128, float: f64) -> Ordering {
    if float.is_nan() {
        return Ordering::Less;
    }
    // Saturating cast; infinities land on the i128 bounds
    let floor = float.floor();
    match int.cmp(&(floor as i128)) {
        Ordering::Equal if float > floor => Ordering::Less,
        ordering => ordering,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64, i64, i8, i16, i32, i64, isize);
number_from!(U64, u64, u8, u16, u32, u64, usize);
number_from!(F64, f64, f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use pagesift::Timestamp;
///
/// let ts = Timestamp::parse("2024-01-29T03:46:40Z").unwrap();
/// assert_eq!(ts, Timestamp(1706500000000));
/// assert!(Timestamp(1000) < Timestamp(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Parses RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC),
    /// a plain `YYYY-MM-DD` date (midnight UTC) or epoch milliseconds.
    pub fn parse(s: &str) -> Option<Timestamp> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Timestamp(naive.and_utc().timestamp_millis()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Timestamp(naive.and_utc().timestamp_millis()));
        }
        s.parse::<i64>().ok().map(Timestamp)
    }

    /// Formats the timestamp as RFC 3339 in UTC.
    pub fn to_rfc3339(self) -> Option<String> {
        DateTime::<Utc>::from_timestamp_millis(self.0).map(|dt| dt.to_rfc3339())
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        t if t.eq_ignore_ascii_case("true") => Some(true),
        t if t.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Owned scalar value stored in a filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Bool(bool),
}

impl Scalar {
    /// Converts a string scalar to the declared field type.
    ///
    /// Scalars that already have a non-string representation, and fields
    /// without a declared type, pass through unchanged.
    pub fn coerce(self, declared: Option<FieldType>) -> std::result::Result<Scalar, String> {
        match (declared, self) {
            (Some(FieldType::Timestamp), Scalar::String(s)) => Timestamp::parse(&s)
                .map(Scalar::Timestamp)
                .ok_or_else(|| format!("'{s}' is not a timestamp")),
            (Some(FieldType::Timestamp), Scalar::Number(n)) => n
                .as_i64()
                .map(|ms| Scalar::Timestamp(Timestamp(ms)))
                .ok_or_else(|| format!("{n} is not a millisecond timestamp")),
            (Some(FieldType::Number), Scalar::String(s)) => Number::parse(&s)
                .map(Scalar::Number)
                .ok_or_else(|| format!("'{s}' is not a number")),
            (Some(FieldType::Bool), Scalar::String(s)) => parse_bool(&s)
                .map(Scalar::Bool)
                .ok_or_else(|| format!("'{s}' is not a boolean")),
            (_, scalar) => Ok(scalar),
        }
    }

    pub(crate) fn from_json(value: serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::String(s) => Some(Scalar::String(s)),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(b)),
            serde_json::Value::Number(n) => json_number(&n).map(Scalar::Number),
            _ => None,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::String(s) => serde_json::Value::String(s.clone()),
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(Number::I64(n)) => serde_json::Value::from(*n),
            Scalar::Number(Number::U64(n)) => serde_json::Value::from(*n),
            Scalar::Number(Number::F64(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Timestamp(t) => t
                .to_rfc3339()
                .map(serde_json::Value::String)
                .unwrap_or_else(|| serde_json::Value::from(t.0)),
        }
    }
}

pub(crate) fn json_number(n: &serde_json::Number) -> Option<Number> {
    n.as_i64()
        .map(Number::I64)
        .or_else(|| n.as_u64().map(Number::U64))
        .or_else(|| n.as_f64().map(Number::F64))
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<Timestamp> for Scalar {
    fn from(t: Timestamp) -> Self {
        Scalar::Timestamp(t)
    }
}

macro_rules! scalar_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Scalar {
                fn from(n: $source) -> Self {
                    Scalar::Number(Number::from(n))
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
