//! Structural validation of filter trees.
//!
//! [`validate`] walks a [`FilterTree`] once, checks it is well-formed and
//! produces a [`ValidatedFilter`]: an immutable normalized tree that the
//! compiler can turn into a predicate without handling malformed input.
//!
//! Rules:
//!
//! - every condition has a non-empty field and a value shaped for its
//!   operator ([`FilterOperator::arity`]);
//! - substring operators take a string value;
//! - a sequence alternates operand, operator, operand, ... and neither
//!   starts nor ends with an operator;
//! - empty groups and empty sequences match everything;
//! - a nested sequence with a single operand is that operand.

use crate::compile::Predicate;
use crate::condition::FilterCondition;
use crate::error::{QueryError, Result};
use crate::filter::{FilterGroup, FilterItem, FilterTree, GroupEntry, Logic};
use crate::op::{FilterOperator, ValueArity};
use crate::record::Schema;
use crate::value::Scalar;

/// Normalized filter node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    /// Matches every record.
    Always,
    Condition(FilterCondition),
    /// Group with AND logic.
    All(Vec<Node>),
    /// Group with OR logic.
    Any(Vec<Node>),
    /// Pairwise sequence, folded left to right.
    Chain {
        head: Box<Node>,
        tail: Vec<(Logic, Node)>,
    },
}

/// A filter tree that passed structural validation.
///
/// Validated filters are immutable. Compiling the same validated filter
/// twice yields predicates that agree on every record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFilter {
    pub(crate) root: Node,
}

impl ValidatedFilter {
    /// A filter that matches every record.
    pub fn always() -> Self {
        ValidatedFilter { root: Node::Always }
    }

    /// Returns `true` if this filter matches every record without looking
    /// at it.
    pub fn is_always(&self) -> bool {
        self.root == Node::Always
    }

    /// Compiles this filter against the declared field types of a record
    /// source.
    pub fn compile(&self, schema: &Schema) -> Result<Predicate> {
        Predicate::compile(self, schema)
    }
}

/// Validates a filter tree.
///
/// # Errors
///
/// - [`QueryError::InvalidFilterStructure`] for empty fields and broken
///   alternation, with the offending position;
/// - [`QueryError::ValueShapeMismatch`] when a value does not fit its operator;
/// - [`QueryError::InvalidOperand`] for non-string substring patterns.
pub fn validate(tree: &FilterTree) -> Result<ValidatedFilter> {
    let mut path = Vec::new();
    let root = match tree {
        FilterTree::Group(group) => validate_group(group, &mut path)?,
        FilterTree::Sequence(items) => validate_sequence(items, &mut path)?,
    };
    Ok(ValidatedFilter { root })
}

fn validate_group(group: &FilterGroup, path: &mut Vec<usize>) -> Result<Node> {
    if group.conditions.is_empty() {
        return Ok(Node::Always);
    }

    let mut children = Vec::with_capacity(group.conditions.len());
    for (position, entry) in group.conditions.iter().enumerate() {
        let child = match entry {
            GroupEntry::Condition(condition) => validate_condition(condition, position, path)?,
            GroupEntry::Group(inner) => {
                path.push(position);
                let node = validate_group(inner, path)?;
                path.pop();
                node
            }
        };
        children.push(child);
    }

    Ok(match group.logic {
        Logic::And => Node::All(children),
        Logic::Or => Node::Any(children),
    })
}

fn validate_sequence(items: &[FilterItem], path: &mut Vec<usize>) -> Result<Node> {
    let mut head: Option<Node> = None;
    let mut tail = Vec::new();
    let mut pending: Option<Logic> = None;

    for (position, item) in items.iter().enumerate() {
        let expects_operand = position % 2 == 0;
        match item {
            FilterItem::Operator { logic } => {
                if expects_operand {
                    let rule = if position == 0 {
                        "sequence must not start with an operator".to_string()
                    } else {
                        format!(
                            "condition or group expected at position {position}, found operator"
                        )
                    };
                    return Err(structure(position, rule, path));
                }
                pending = Some(*logic);
            }
            FilterItem::Condition(_) | FilterItem::Group { .. } => {
                if !expects_operand {
                    return Err(structure(
                        position,
                        format!("operator expected at position {position}"),
                        path,
                    ));
                }
                let node = validate_operand(item, position, path)?;
                match pending.take() {
                    Some(logic) => tail.push((logic, node)),
                    None => head = Some(node),
                }
            }
        }
    }

    if pending.is_some() {
        let position = items.len() - 1;
        return Err(structure(
            position,
            "sequence must not end with an operator".to_string(),
            path,
        ));
    }

    Ok(match head {
        None => Node::Always,
        Some(head) if tail.is_empty() => head,
        Some(head) => Node::Chain {
            head: Box::new(head),
            tail,
        },
    })
}

fn validate_operand(item: &FilterItem, position: usize, path: &mut Vec<usize>) -> Result<Node> {
    match item {
        FilterItem::Condition(condition) => validate_condition(condition, position, path),
        FilterItem::Group { items } => {
            path.push(position);
            let node = validate_sequence(items, path)?;
            path.pop();
            Ok(node)
        }
        FilterItem::Operator { .. } => Err(structure(
            position,
            format!("condition or group expected at position {position}, found operator"),
            path,
        )),
    }
}

fn validate_condition(
    condition: &FilterCondition,
    position: usize,
    path: &[usize],
) -> Result<Node> {
    if condition.field.trim().is_empty() {
        return Err(structure(
            position,
            format!("condition at position {position} has an empty field"),
            path,
        ));
    }

    let operator = condition.operator;
    let expected = operator.arity();
    let shape_ok = match (&condition.value, expected) {
        (None, ValueArity::None) => true,
        (Some(value), arity) => value.has_arity(arity),
        (None, _) => false,
    };
    if !shape_ok {
        return Err(QueryError::ValueShapeMismatch { operator, expected });
    }

    if operator.is_string_op() {
        check_pattern(condition, operator)?;
    }

    Ok(Node::Condition(condition.clone()))
}

fn check_pattern(condition: &FilterCondition, operator: FilterOperator) -> Result<()> {
    match condition.value.as_ref().and_then(|v| v.as_scalar()) {
        Some(Scalar::String(_)) => Ok(()),
        _ => Err(QueryError::InvalidOperand {
            field: condition.field.clone(),
            reason: format!("{operator} needs a string value"),
        }),
    }
}

fn structure(position: usize, rule: String, path: &[usize]) -> QueryError {
    let reason = if path.is_empty() {
        rule
    } else {
        let nesting: Vec<String> = path.iter().map(usize::to_string).collect();
        format!("{rule} (inside group at {})", nesting.join(" > "))
    };
    QueryError::InvalidFilterStructure { position, reason }
}
