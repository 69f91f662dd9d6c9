//! Property-based tests for pagesift using proptest.

use std::cmp::Ordering;

use pagesift::{
    compare_values, total_pages, validate, FilterCondition, FilterItem, FilterOperator,
    FilterTree, Number, PageQuery, QueryOptions, Record, Schema, SortConfig, SortPlan, Value,
};
use proptest::prelude::*;
use serde_json::{json, Value as Json};

// ============================================================================
// Test helpers
// ============================================================================

fn records(values: &[i64]) -> Vec<Json> {
    values
        .iter()
        .enumerate()
        .map(|(id, v)| json!({"id": id, "v": v}))
        .collect()
}

fn field_i64(record: &Json, field: &str) -> i64 {
    record[field].as_i64().unwrap_or_default()
}

/// A record whose single field `v` may hold any kind of value, NaN included.
#[derive(Debug, Clone)]
enum Mixed {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Record for Mixed {
    fn field(&self, name: &str) -> Value<'_> {
        match (name, self) {
            ("v", Mixed::Bool(b)) => Value::Bool(*b),
            ("v", Mixed::Int(n)) => Value::Number(Number::I64(*n)),
            ("v", Mixed::Float(n)) => Value::Number(Number::F64(*n)),
            ("v", Mixed::Text(s)) => Value::String(s),
            _ => Value::None,
        }
    }
}

fn mixed() -> impl Strategy<Value = Mixed> {
    prop_oneof![
        any::<bool>().prop_map(Mixed::Bool),
        (-20i64..20).prop_map(Mixed::Int),
        prop_oneof![(-20.0f64..20.0), Just(f64::NAN), Just(f64::INFINITY)].prop_map(Mixed::Float),
        "[a-c]{0,2}".prop_map(Mixed::Text),
        Just(Mixed::Null),
    ]
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Concatenating every page gives back the whole sorted sequence.
    #[test]
    fn pages_partition_sorted_sequence(
        values in prop::collection::vec(-50i64..50, 0..80),
        size in 1i64..15,
    ) {
        let source = records(&values);
        let everything = PageQuery::new()
            .sort_desc("v")
            .size(i64::try_from(source.len().max(1)).unwrap())
            .execute_with(&source, &Schema::new(), &QueryOptions::unbounded())
            .unwrap();

        let mut concatenated = Vec::new();
        for page in 0..everything.page.total_pages.max(1) {
            let slice = PageQuery::new()
                .sort_desc("v")
                .page(page)
                .size(size)
                .execute(&source)
                .unwrap();
            prop_assert!(slice.len() as i64 <= size);
            prop_assert_eq!(slice.page.total_elements, source.len() as i64);
            concatenated.extend(slice.data);
        }

        prop_assert_eq!(concatenated, everything.data);
    }

    /// Sorting is stable: equal keys keep source order.
    #[test]
    fn sort_is_stable(values in prop::collection::vec(0i64..4, 0..60)) {
        let source = records(&values);
        let page = PageQuery::new()
            .sort_asc("v")
            .size(100)
            .execute(&source)
            .unwrap();
        for pair in page.data.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(field_i64(a, "v") <= field_i64(b, "v"));
            if field_i64(a, "v") == field_i64(b, "v") {
                prop_assert!(field_i64(a, "id") < field_i64(b, "id"));
            }
        }
    }

    /// Mixed kinds and NaN still sort into a consistent order, with nulls
    /// last in both directions.
    #[test]
    fn mixed_kinds_sort_totally(values in prop::collection::vec(mixed(), 0..40)) {
        let mut ascending = values.clone();
        SortPlan::new(&[SortConfig::asc("v")], &Schema::new()).sort(&mut ascending);
        for pair in ascending.windows(2) {
            let (a, b) = (pair[0].field("v"), pair[1].field("v"));
            prop_assert_ne!(compare_values(&a, &b), Ordering::Greater, "{:?} before {:?}", a, b);
        }

        let mut descending = values;
        SortPlan::new(&[SortConfig::desc("v")], &Schema::new()).sort(&mut descending);
        for pair in descending.windows(2) {
            let (a, b) = (pair[0].field("v"), pair[1].field("v"));
            if a.is_none() {
                prop_assert!(b.is_none());
            } else if !b.is_none() {
                prop_assert_ne!(compare_values(&a, &b), Ordering::Less, "{:?} before {:?}", a, b);
            }
        }
    }

    /// totalPages is the ceiling of totalElements / size.
    #[test]
    fn total_pages_is_ceiling(total in 0i64..100_000, size in 1i64..1_000) {
        let expected = (total + size - 1) / size;
        prop_assert_eq!(total_pages(total, size), expected);
        prop_assert!(total_pages(total, size) * size >= total);
    }

    /// Filtering never returns more records than the source, and every
    /// returned record satisfies the condition.
    #[test]
    fn filter_never_grows_collection(
        values in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let source = records(&values);
        let page = PageQuery::new()
            .filter(FilterCondition::new("v", FilterOperator::GreaterThan, threshold))
            .size(1000)
            .execute(&source)
            .unwrap();

        prop_assert!(page.page.total_elements <= source.len() as i64);
        prop_assert!(page.data.iter().all(|r| field_i64(r, "v") > threshold));
        let expected = values.iter().filter(|v| **v > threshold).count();
        prop_assert_eq!(page.page.total_elements, expected as i64);
    }

    /// A sequence evaluates as a strict left-to-right fold.
    #[test]
    fn sequence_is_left_fold(
        operands in prop::collection::vec(any::<bool>(), 1..8),
        ands in prop::collection::vec(any::<bool>(), 7),
    ) {
        let mut record = serde_json::Map::new();
        let mut items = Vec::new();
        for (i, value) in operands.iter().enumerate() {
            let field = format!("c{i}");
            record.insert(field.clone(), json!(value));
            if i > 0 {
                items.push(if ands[i - 1] { FilterItem::and() } else { FilterItem::or() });
            }
            let condition = FilterCondition::new(field, FilterOperator::Equals, true);
            items.push(FilterItem::condition(condition));
        }

        let expected = operands[1..]
            .iter()
            .zip(&ands)
            .fold(operands[0], |acc, (value, and)| {
                if *and { acc && *value } else { acc || *value }
            });

        let predicate = validate(&FilterTree::Sequence(items))
            .unwrap()
            .compile(&Schema::new())
            .unwrap();
        prop_assert_eq!(predicate.matches(&record), expected);
    }

    /// Operator tokens resolve regardless of case.
    #[test]
    fn operator_resolution_ignores_case(index in 0usize..13, upper in any::<bool>()) {
        let op = FilterOperator::ALL[index];
        let token = if upper { op.alias().to_uppercase() } else { op.name().to_lowercase() };
        prop_assert_eq!(FilterOperator::resolve(&token).unwrap(), op);
    }
}
