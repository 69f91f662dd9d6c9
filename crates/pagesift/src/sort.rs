//! Multi-key sorting of query results.
//!
//! Provides [`Direction`] and [`SortConfig`] for the request side and
//! [`SortPlan`], which compares records field by field.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{Record, Schema};
use crate::value::{FieldType, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Direction {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("asc") => Ok(Direction::Asc),
            t if t.eq_ignore_ascii_case("desc") => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction '{other}', expected ASC or DESC")),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.as_str().to_string()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(default)]
    pub direction: Direction,
}

impl SortConfig {
    /// Creates a new ascending sort key for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        SortConfig::new(field, Direction::Asc)
    }

    /// Creates a new descending sort key for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        SortConfig::new(field, Direction::Desc)
    }

    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        SortConfig {
            field: field.into(),
            direction,
        }
    }
}

/// Total order over sort values.
///
/// Values of the same kind compare naturally, with NaN after every other
/// number. Different kinds order by kind: booleans, numbers, timestamps,
/// strings, then nulls.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::String(_) => 3,
        Value::None => 4,
    }
}

#[derive(Debug, Clone)]
struct SortKey {
    field: String,
    direction: Direction,
    declared: Option<FieldType>,
}

/// Sort keys resolved against a schema.
///
/// Compares records key by key in list order: the first key is the primary
/// sort, the next breaks ties, and so on. Values follow
/// [`compare_values`], except that nulls sort last in both directions. An
/// empty plan keeps source order.
#[derive(Debug, Clone, Default)]
pub struct SortPlan {
    keys: Vec<SortKey>,
}

impl SortPlan {
    pub fn new(sorts: &[SortConfig], schema: &Schema) -> Self {
        SortPlan {
            keys: sorts
                .iter()
                .map(|sort| SortKey {
                    field: sort.field.clone(),
                    direction: sort.direction,
                    declared: schema.field_type(&sort.field),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two records according to this plan.
    pub fn compare(&self, a: &dyn Record, b: &dyn Record) -> Ordering {
        for key in &self.keys {
            let val_a = a.field(&key.field).coerce(key.declared);
            let val_b = b.field(&key.field).coerce(key.declared);

            // Nulls stay last regardless of direction
            let ordering = match (val_a.is_none(), val_b.is_none()) {
                (false, false) => key.direction.apply(compare_values(&val_a, &val_b)),
                (a_null, b_null) => a_null.cmp(&b_null),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts records in place. The sort is stable: records that compare
    /// equal keep their relative order.
    pub fn sort<R: Record>(&self, records: &mut [R]) {
        if self.keys.is_empty() {
            return;
        }
        records.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};
    use serde_json::json;

    #[test]
    fn direction_apply() {
        assert_eq!(Direction::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Direction::Asc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Direction::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Direction::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn direction_wire_format() {
        let config: SortConfig =
            serde_json::from_str(r#"{"field": "weight", "direction": "desc"}"#).unwrap();
        assert_eq!(config, SortConfig::desc("weight"));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"field": "weight", "direction": "DESC"})
        );

        let config: SortConfig = serde_json::from_str(r#"{"field": "name"}"#).unwrap();
        assert_eq!(config.direction, Direction::Asc);

        let bad = serde_json::from_str::<SortConfig>(r#"{"field": "a", "direction": "up"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn compare_values_by_kind() {
        assert_eq!(
            compare_values(&Value::String("apple"), &Value::String("banana")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Number(Number::I64(20)), &Value::Number(Number::U64(10))),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(1)), &Value::Timestamp(Timestamp(2))),
            Ordering::Less
        );
        // false < true in Rust's bool ordering
        assert_eq!(compare_values(&Value::Bool(false), &Value::Bool(true)), Ordering::Less);
    }

    #[test]
    fn compare_values_across_kinds() {
        let ranked = [
            Value::Bool(true),
            Value::Number(Number::I64(-5)),
            Value::Number(Number::F64(2.5)),
            Value::Number(Number::U64(u64::MAX)),
            Value::Number(Number::F64(f64::INFINITY)),
            Value::Number(Number::F64(f64::NAN)),
            Value::Timestamp(Timestamp(0)),
            Value::String("1"),
            Value::None,
        ];
        for (i, a) in ranked.iter().enumerate() {
            for (j, b) in ranked.iter().enumerate() {
                assert_eq!(compare_values(a, b), i.cmp(&j), "{a:?} vs {b:?}");
            }
        }
    }

    fn ids(records: &[serde_json::Value]) -> Vec<i64> {
        records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn multi_key_sort_with_ties() {
        let mut records = vec![
            json!({"id": 1, "priority": 1, "name": "b"}),
            json!({"id": 2, "priority": 2, "name": "a"}),
            json!({"id": 3, "priority": 1, "name": "a"}),
            json!({"id": 4, "priority": 2, "name": "a"}),
        ];
        let plan = SortPlan::new(
            &[SortConfig::desc("priority"), SortConfig::asc("name")],
            &Schema::new(),
        );
        plan.sort(&mut records);
        // 2 and 4 tie on both keys and keep source order
        assert_eq!(ids(&records), [2, 4, 3, 1]);
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let source = vec![
            json!({"id": 1}),
            json!({"id": 2, "weight": 5}),
            json!({"id": 3, "weight": 9}),
        ];

        let mut records = source.clone();
        SortPlan::new(&[SortConfig::asc("weight")], &Schema::new()).sort(&mut records);
        assert_eq!(ids(&records), [2, 3, 1]);

        let mut records = source;
        SortPlan::new(&[SortConfig::desc("weight")], &Schema::new()).sort(&mut records);
        assert_eq!(ids(&records), [3, 2, 1]);
    }

    #[test]
    fn declared_timestamps_sort_chronologically() {
        let mut records = vec![
            json!({"id": 1, "at": "2024-03-01T00:00:00+05:00"}),
            json!({"id": 2, "at": "2024-02-29T23:00:00Z"}),
        ];
        // As strings "2024-02..." < "2024-03...", as instants 1 is earlier
        let schema = Schema::new().with("at", FieldType::Timestamp);
        SortPlan::new(&[SortConfig::asc("at")], &schema).sort(&mut records);
        assert_eq!(ids(&records), [1, 2]);

        SortPlan::new(&[SortConfig::asc("at")], &Schema::new()).sort(&mut records);
        assert_eq!(ids(&records), [2, 1]);
    }

    #[test]
    fn mixed_kinds_sort_by_kind() {
        let source = vec![
            json!({"id": 1, "v": 3}),
            json!({"id": 2, "v": "x"}),
            json!({"id": 3, "v": 1}),
            json!({"id": 4, "v": true}),
            json!({"id": 5}),
        ];

        let mut records = source.clone();
        SortPlan::new(&[SortConfig::asc("v")], &Schema::new()).sort(&mut records);
        assert_eq!(ids(&records), [4, 3, 1, 2, 5]);

        let mut records = source;
        SortPlan::new(&[SortConfig::desc("v")], &Schema::new()).sort(&mut records);
        assert_eq!(ids(&records), [2, 1, 3, 4, 5]);
    }

    #[test]
    fn nan_sorts_after_numbers() {
        let mut sorted = vec![
            Value::Number(Number::I64(2)),
            Value::Number(Number::F64(f64::NAN)),
            Value::Number(Number::I64(1)),
        ];
        sorted.sort_by(compare_values);
        assert_eq!(sorted[0], Value::Number(Number::I64(1)));
        assert_eq!(sorted[1], Value::Number(Number::I64(2)));
        assert!(matches!(sorted[2], Value::Number(Number::F64(n)) if n.is_nan()));
    }

    #[test]
    fn empty_plan_keeps_source_order() {
        let mut records = vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})];
        let plan = SortPlan::new(&[], &Schema::new());
        assert!(plan.is_empty());
        plan.sort(&mut records);
        assert_eq!(ids(&records), [3, 1, 2]);
    }
}
