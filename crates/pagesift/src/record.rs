//! The record capability the engine queries.
//!
//! This module provides the [`Record`] trait, implemented by the
//! `#[derive(Record)]` macro or by hand, the [`Schema`] of declared field
//! types, and the [`ToValue`] conversions the derive relies on.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::value::{FieldType, Number, Timestamp, Value};

/// An entity that can be filtered and sorted by field name.
///
/// This trait is typically derived using `#[derive(Record)]`, but can also
/// be implemented manually.
///
/// # Derive Usage
///
/// ```ignore
/// use pagesift::{PageQuery, Record};
///
/// #[derive(Record)]
/// struct Parcel {
///     #[record(String)]
///     status: String,
///     #[record(Number)]
///     weight: u32,
///     #[record(Timestamp, rename = "createdAt")]
///     created_at: i64,
/// }
///
/// let parcels = vec![Parcel { status: "A".into(), weight: 3, created_at: 0 }];
/// let page = PageQuery::new().sort_desc(Parcel::WEIGHT).execute(&parcels)?;
/// ```
///
/// # Manual Implementation
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
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the field is
    /// absent, null or not queryable.
    fn field(&self, name: &str) -> Value<'_>;

    /// Returns the declared field types of this record type.
    ///
    /// The default is an empty schema: values are compared as the record
    /// hands them out.
    fn schema() -> Schema
    where
        Self: Sized,
    {
        Schema::new()
    }
}

impl<R: Record> Record for &R {
    fn field(&self, name: &str) -> Value<'_> {
        (**self).field(name)
    }

    fn schema() -> Schema {
        R::schema()
    }
}

/// JSON objects are records: keys are field names.
///
/// A name that is not a key is read as a dotted path into nested objects
/// (`"address.city"`). Arrays and objects read as null.
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Value<'_> {
        match self {
            serde_json::Value::Object(map) => map.field(name),
            _ => Value::None,
        }
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> Value<'_> {
        if let Some(value) = self.get(name) {
            return json_value(value);
        }
        match name.split_once('.') {
            Some((head, rest)) => match self.get(head) {
                Some(nested) => nested.field(rest),
                None => Value::None,
            },
            None => Value::None,
        }
    }
}

fn json_value(value: &serde_json::Value) -> Value<'_> {
    match value {
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => crate::value::json_number(n)
            .map(Value::Number)
            .unwrap_or(Value::None),
        _ => Value::None,
    }
}

/// Declared field types of a record source.
///
/// Fields missing from the schema are compared as the record hands them
/// out. Serializes as a plain `{"field": "type"}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Adds a field declaration, builder style.
    pub fn with(mut self, field: impl Into<String>, ty: FieldType) -> Self {
        self.insert(field, ty);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, ty: FieldType) {
        self.fields.insert(field.into(), ty);
    }

    /// Returns the declared type of a field.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over declared fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl<S: Into<String>> FromIterator<(S, FieldType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, FieldType)>>(iter: I) -> Self {
        Schema {
            fields: iter.into_iter().map(|(name, ty)| (name.into(), ty)).collect(),
        }
    }
}

/// Conversion of a struct field into a runtime [`Value`].
///
/// Used by the `#[derive(Record)]` macro. Implement it for your own types
/// to make them queryable.
///
/// ```
/// use pagesift::{ToValue, Value};
///
/// enum Status {
///     Active,
///     Closed,
/// }
///
/// impl ToValue for Status {
///     fn to_value(&self) -> Value<'_> {
///         Value::String(match self {
///             Status::Active => "ACTIVE",
///             Status::Closed => "CLOSED",
///         })
///     }
/// }
/// ```
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value<'_> {
        Value::Number(*self)
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(Timestamp(self.timestamp_millis()))
    }
}

/// Naive date-times are read as UTC.
impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(Timestamp(self.and_utc().timestamp_millis()))
    }
}

macro_rules! to_value_number {
    ($($source:ty),*) => {
        $(
            impl ToValue for $source {
                fn to_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

to_value_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
