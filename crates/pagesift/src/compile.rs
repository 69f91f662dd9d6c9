//! Compilation of validated filters into record predicates.

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::condition::{FilterCondition, Operand};
use crate::error::{QueryError, Result};
use crate::filter::Logic;
use crate::op::FilterOperator;
use crate::record::{Record, Schema};
use crate::validate::{Node, ValidatedFilter};
use crate::value::{FieldType, Scalar};

type Test = Box<dyn Fn(&dyn Record) -> bool + Send + Sync>;

/// An executable filter over records.
///
/// Built from a [`ValidatedFilter`] and the [`Schema`] of the record
/// source. Predicates are immutable and can be shared across threads.
///
/// Groups fold their children with their logic (AND over no children is
/// true, OR over no children is false). Sequences fold strictly left to
/// right with no precedence between AND and OR.
pub struct Predicate {
    test: Test,
}

impl Predicate {
    /// A predicate that matches every record.
    pub fn always() -> Self {
        Predicate {
            test: Box::new(|_: &dyn Record| true),
        }
    }

    /// Compiles a validated filter.
    ///
    /// Operands are converted to the declared type of their field.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidOperand`] if an operand cannot be converted.
    pub fn compile(filter: &ValidatedFilter, schema: &Schema) -> Result<Self> {
        Ok(Predicate {
            test: compile_node(&filter.root, schema)?,
        })
    }

    /// Tests a record.
    pub fn test(&self, record: &dyn Record) -> bool {
        (self.test)(record)
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        (self.test)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

fn compile_node(node: &Node, schema: &Schema) -> Result<Test> {
    Ok(match node {
        Node::Always => Box::new(|_: &dyn Record| true),
        Node::Condition(condition) => {
            let compiled = CompiledCondition::new(condition, schema)?;
            Box::new(move |record: &dyn Record| compiled.matches(record))
        }
        Node::All(children) => {
            let tests = compile_all(children, schema)?;
            Box::new(move |record: &dyn Record| tests.iter().all(|test| test(record)))
        }
        Node::Any(children) => {
            let tests = compile_all(children, schema)?;
            Box::new(move |record: &dyn Record| tests.iter().any(|test| test(record)))
        }
        Node::Chain { head, tail } => {
            let head = compile_node(head, schema)?;
            let tail = tail
                .iter()
                .map(|(logic, node)| -> Result<(Logic, Test)> {
                    Ok((*logic, compile_node(node, schema)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Box::new(move |record: &dyn Record| {
                tail.iter()
                    .fold(head(record), |acc, (logic, test)| logic.apply(acc, || test(record)))
            })
        }
    })
}

fn compile_all(nodes: &[Node], schema: &Schema) -> Result<Vec<Test>> {
    nodes.iter().map(|node| compile_node(node, schema)).collect()
}

/// A condition with its operand converted to the field's declared type.
#[derive(Debug, Clone)]
pub(crate) struct CompiledCondition {
    field: String,
    operator: FilterOperator,
    operand: Option<Operand>,
    case_sensitive: bool,
    declared: Option<FieldType>,
}

impl CompiledCondition {
    pub(crate) fn new(condition: &FilterCondition, schema: &Schema) -> Result<Self> {
        let operator = condition.operator;
        // Substring operators always work on text
        let declared = if operator.is_string_op() {
            None
        } else {
            schema.field_type(&condition.field)
        };

        let operand = match condition.value.clone() {
            Some(value) => Some(value.coerce(declared).map_err(|reason| {
                QueryError::InvalidOperand {
                    field: condition.field.clone(),
                    reason,
                }
            })?),
            None => None,
        };
        let operand = match operand {
            Some(Operand::List(mut bounds)) if operator == FilterOperator::Between => {
                if let [low, high] = bounds.as_slice() {
                    if descending(low, high, condition.case_sensitive) {
                        bounds.swap(0, 1);
                    }
                }
                Some(Operand::List(bounds))
            }
            other => other,
        };

        Ok(CompiledCondition {
            field: condition.field.clone(),
            operator,
            operand,
            case_sensitive: condition.case_sensitive,
            declared,
        })
    }

    /// Evaluates the condition against one record.
    ///
    /// # Errors
    ///
    /// [`QueryError::TypeMismatch`] if the field value cannot be compared
    /// with the operator.
    pub(crate) fn evaluate(&self, record: &dyn Record) -> Result<bool> {
        let value = record.field(&self.field).coerce(self.declared);
        self.operator
            .compare(self.case_sensitive, &value, self.operand.as_ref())
            .ok_or_else(|| QueryError::TypeMismatch {
                field: self.field.clone(),
                operator: self.operator,
            })
    }

    fn matches(&self, record: &dyn Record) -> bool {
        match self.evaluate(record) {
            Ok(matched) => matched,
            Err(err) => {
                trace!(
                    field = %self.field,
                    operator = %self.operator,
                    "{err}, treating as no match"
                );
                false
            }
        }
    }
}

fn descending(low: &Scalar, high: &Scalar, case_sensitive: bool) -> bool {
    let ordering = match (low, high) {
        (Scalar::String(a), Scalar::String(b)) if !case_sensitive => {
            Some(a.to_lowercase().cmp(&b.to_lowercase()))
        }
        (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
        (Scalar::Number(a), Scalar::Number(b)) => a.compare(*b),
        (Scalar::Timestamp(a), Scalar::Timestamp(b)) => Some(a.cmp(b)),
        _ => None,
    };
    ordering == Some(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterGroup, FilterItem, FilterTree, GroupEntry};
    use crate::validate::validate;
    use serde_json::json;

    fn compile(tree: impl Into<FilterTree>, schema: &Schema) -> Predicate {
        validate(&tree.into()).unwrap().compile(schema).unwrap()
    }

    fn eq(field: &str, value: impl Into<Operand>) -> FilterCondition {
        FilterCondition::new(field, FilterOperator::Equals, value)
    }

    #[test]
    fn sequence_folds_left_to_right() {
        // a OR b AND c == (a OR b) AND c
        let record = json!({"a": false, "b": true, "c": false});
        let predicate = compile(
            vec![
                FilterItem::condition(eq("a", true)),
                FilterItem::or(),
                FilterItem::condition(eq("b", true)),
                FilterItem::and(),
                FilterItem::condition(eq("c", true)),
            ],
            &Schema::new(),
        );
        assert!(!predicate.matches(&record));

        // a AND b OR c == (a AND b) OR c
        let record = json!({"a": false, "b": false, "c": true});
        let predicate = compile(
            vec![
                FilterItem::condition(eq("a", true)),
                FilterItem::and(),
                FilterItem::condition(eq("b", true)),
                FilterItem::or(),
                FilterItem::condition(eq("c", true)),
            ],
            &Schema::new(),
        );
        assert!(predicate.matches(&record));
    }

    #[test]
    fn nested_sequence_groups_are_opaque() {
        // a OR (b AND c)
        let record = json!({"a": false, "b": true, "c": true});
        let predicate = compile(
            vec![
                FilterItem::condition(eq("a", true)),
                FilterItem::or(),
                FilterItem::group(vec![
                    FilterItem::condition(eq("b", true)),
                    FilterItem::and(),
                    FilterItem::condition(eq("c", true)),
                ]),
            ],
            &Schema::new(),
        );
        assert!(predicate.matches(&record));
        assert!(!predicate.matches(&json!({"a": false, "b": true, "c": false})));
    }

    #[test]
    fn uniform_groups() {
        let group = FilterGroup::any([
            GroupEntry::from(eq("status", "A")),
            GroupEntry::from(FilterGroup::all([
                eq("status", "B"),
                FilterCondition::new("weight", FilterOperator::GreaterThan, 5),
            ])),
        ]);
        let predicate = compile(group, &Schema::new());
        assert!(predicate.matches(&json!({"status": "a"})));
        assert!(predicate.matches(&json!({"status": "B", "weight": 6})));
        assert!(!predicate.matches(&json!({"status": "B", "weight": 5})));
        assert!(!predicate.matches(&json!({"status": "C", "weight": 9})));
    }

    #[test]
    fn empty_filters_match_everything() {
        let record = json!({});
        assert!(compile(FilterGroup::new(Logic::And), &Schema::new()).matches(&record));
        assert!(compile(FilterGroup::new(Logic::Or), &Schema::new()).matches(&record));
        assert!(compile(Vec::<FilterItem>::new(), &Schema::new()).matches(&record));
        assert!(Predicate::always().test(&record));
    }

    #[test]
    fn missing_fields_read_as_null() {
        let record = json!({"status": "A"});
        let is_null = FilterCondition::unary("deliveredAt", FilterOperator::IsNull);
        assert!(compile(is_null, &Schema::new()).matches(&record));
        let not_equals = FilterCondition::new("deliveredAt", FilterOperator::NotEquals, "x");
        let predicate = compile(not_equals, &Schema::new());
        assert!(predicate.matches(&record));
    }

    #[test]
    fn type_mismatch_is_no_match() {
        let condition = FilterCondition::new("weight", FilterOperator::GreaterThan, 5);
        let compiled = CompiledCondition::new(&condition, &Schema::new()).unwrap();
        let record = json!({"weight": "heavy"});
        assert!(matches!(
            compiled.evaluate(&record),
            Err(QueryError::TypeMismatch {
                ref field,
                operator: FilterOperator::GreaterThan,
            }) if field == "weight"
        ));
        assert!(!compile(condition, &Schema::new()).matches(&record));
    }

    #[test]
    fn operands_follow_declared_types() {
        let schema = Schema::new()
            .with("createdAt", FieldType::Timestamp)
            .with("weight", FieldType::Number);
        let predicate = compile(
            FilterGroup::all([
                FilterCondition::new("createdAt", FilterOperator::GreaterOrEqual, "2024-01-01"),
                FilterCondition::new("weight", FilterOperator::LessThan, "10"),
            ]),
            &schema,
        );
        assert!(predicate.matches(&json!({"createdAt": "2024-01-01T08:00:00Z", "weight": 9})));
        assert!(!predicate.matches(&json!({"createdAt": "2023-12-31T23:59:59Z", "weight": 9})));
        assert!(!predicate.matches(&json!({"createdAt": "2024-06-01T00:00:00Z", "weight": "12"})));
    }

    #[test]
    fn uncoercible_operand_fails_compilation() {
        let schema = Schema::new().with("createdAt", FieldType::Timestamp);
        let condition = FilterCondition::new("createdAt", FilterOperator::LessThan, "soon");
        let tree = FilterTree::from(condition);
        let err = validate(&tree).unwrap().compile(&schema).unwrap_err();
        match err {
            QueryError::InvalidOperand { field, reason } => {
                assert_eq!(field, "createdAt");
                assert!(reason.contains("not a timestamp"));
            }
            other => panic!("expected invalid operand, got {other:?}"),
        }
    }

    #[test]
    fn substring_operators_ignore_declared_type() {
        let schema = Schema::new().with("code", FieldType::Number);
        let starts_with = FilterCondition::new("code", FilterOperator::StartsWith, "12");
        let predicate = compile(starts_with, &schema);
        assert!(predicate.matches(&json!({"code": "1234"})));
    }

    #[test]
    fn between_swaps_descending_bounds() {
        let reversed = FilterCondition::new("weight", FilterOperator::Between, (10, 1));
        let predicate = compile(reversed, &Schema::new());
        assert!(predicate.matches(&json!({"weight": 1})));
        assert!(predicate.matches(&json!({"weight": 10})));
        assert!(!predicate.matches(&json!({"weight": 11})));

        let reversed = FilterCondition::new("name", FilterOperator::Between, ("m", "B"));
        let predicate = compile(reversed, &Schema::new());
        assert!(predicate.matches(&json!({"name": "Dora"})));
        assert!(!predicate.matches(&json!({"name": "zed"})));
    }

    #[test]
    fn recompiling_gives_equivalent_predicates() {
        let tree = FilterTree::from(vec![
            FilterItem::condition(eq("a", 1)),
            FilterItem::or(),
            FilterItem::condition(FilterCondition::new("b", FilterOperator::In, ["x", "y"])),
        ]);
        let validated = validate(&tree).unwrap();
        let first = validated.compile(&Schema::new()).unwrap();
        let second = validated.compile(&Schema::new()).unwrap();
        let records = [
            json!({"a": 1}),
            json!({"a": 2, "b": "Y"}),
            json!({"a": 2, "b": "z"}),
            json!({}),
        ];
        for record in &records {
            assert_eq!(first.matches(record), second.matches(record));
        }
    }

    #[test]
    fn predicate_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate>();
        assert_send_sync::<ValidatedFilter>();
    }
}
