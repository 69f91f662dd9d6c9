//! Filter tree model.
//!
//! Two tree dialects are accepted:
//!
//! - **Group** ([`FilterGroup`]): one [`Logic`] applies uniformly to all
//!   direct children; nesting groups expresses mixed precedence.
//! - **Sequence** (`Vec<FilterItem>`): an operand, then alternating
//!   operator and operand items. Operators bind strictly left to right with
//!   no precedence between AND and OR:
//!
//! ```text
//! [a, OR, b, AND, c]  ==  (a OR b) AND c
//! ```
//!
//! On the wire a group is a JSON object and a sequence is a JSON array:
//!
//! ```json
//! {"logic": "OR", "conditions": [{"field": "status", "operator": "EQUALS", "value": "A"}]}
//! [{"type": "condition", "field": "status", "operator": "eq", "value": "A"},
//!  {"type": "operator", "logic": "AND"},
//!  {"type": "group", "items": [...]}]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::condition::FilterCondition;

/// Boolean connective between filter operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    /// Returns the wire name of this connective.
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }

    /// Combines an accumulated result with the next operand.
    pub fn apply(self, left: bool, right: impl FnOnce() -> bool) -> bool {
        match self {
            Logic::And => left && right(),
            Logic::Or => left || right(),
        }
    }
}

impl FromStr for Logic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("and") => Ok(Logic::And),
            t if t.eq_ignore_ascii_case("or") => Ok(Logic::Or),
            other => Err(format!("unknown logic operator '{other}', expected AND or OR")),
        }
    }
}

impl TryFrom<String> for Logic {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Logic> for String {
    fn from(logic: Logic) -> Self {
        logic.as_str().to_string()
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform-logic group of conditions and nested groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<GroupEntry>,
}

impl FilterGroup {
    /// Creates an empty group. An empty group matches every record.
    pub fn new(logic: Logic) -> Self {
        FilterGroup {
            logic,
            conditions: Vec::new(),
        }
    }

    /// Creates a group whose entries must all match.
    pub fn all<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<GroupEntry>,
    {
        FilterGroup {
            logic: Logic::And,
            conditions: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a group where at least one entry must match.
    pub fn any<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<GroupEntry>,
    {
        FilterGroup {
            logic: Logic::Or,
            conditions: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends an entry.
    pub fn with(mut self, entry: impl Into<GroupEntry>) -> Self {
        self.conditions.push(entry.into());
        self
    }
}

/// Child of a [`FilterGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupEntry {
    Condition(FilterCondition),
    Group(FilterGroup),
}

impl<'de> Deserialize<'de> for GroupEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_group = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("logic") || obj.contains_key("conditions"));
        let entry = if is_group {
            serde_json::from_value(value).map(GroupEntry::Group)
        } else {
            serde_json::from_value(value).map(GroupEntry::Condition)
        };
        entry.map_err(de::Error::custom)
    }
}

impl From<FilterCondition> for GroupEntry {
    fn from(condition: FilterCondition) -> Self {
        GroupEntry::Condition(condition)
    }
}

impl From<FilterGroup> for GroupEntry {
    fn from(group: FilterGroup) -> Self {
        GroupEntry::Group(group)
    }
}

/// Item of a pairwise-operator sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterItem {
    /// A condition leaf.
    Condition(FilterCondition),
    /// A connective between the previous and next operand.
    Operator {
        #[serde(alias = "operator")]
        logic: Logic,
    },
    /// A nested sequence, evaluated to a single boolean.
    Group {
        #[serde(default)]
        items: Vec<FilterItem>,
    },
}

impl FilterItem {
    pub fn condition(condition: FilterCondition) -> Self {
        FilterItem::Condition(condition)
    }

    pub fn and() -> Self {
        FilterItem::Operator { logic: Logic::And }
    }

    pub fn or() -> Self {
        FilterItem::Operator { logic: Logic::Or }
    }

    pub fn group(items: Vec<FilterItem>) -> Self {
        FilterItem::Group { items }
    }

    /// Returns `true` for operator items.
    pub fn is_operator(&self) -> bool {
        matches!(self, FilterItem::Operator { .. })
    }
}

impl From<FilterCondition> for FilterItem {
    fn from(condition: FilterCondition) -> Self {
        FilterItem::Condition(condition)
    }
}

/// A filter expression in either dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterTree {
    Group(FilterGroup),
    Sequence(Vec<FilterItem>),
}

impl FilterTree {
    /// Returns the dialect name, used in logs.
    pub fn dialect(&self) -> &'static str {
        match self {
            FilterTree::Group(_) => "group",
            FilterTree::Sequence(_) => "sequence",
        }
    }
}

impl<'de> Deserialize<'de> for FilterTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tree = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value).map(FilterTree::Sequence),
            serde_json::Value::Object(_) => serde_json::from_value(value).map(FilterTree::Group),
            other => {
                return Err(de::Error::custom(format!(
                    "filters must be a group object or an item array, got {other}"
                )))
            }
        };
        tree.map_err(de::Error::custom)
    }
}

impl From<FilterGroup> for FilterTree {
    fn from(group: FilterGroup) -> Self {
        FilterTree::Group(group)
    }
}

impl From<Vec<FilterItem>> for FilterTree {
    fn from(items: Vec<FilterItem>) -> Self {
        FilterTree::Sequence(items)
    }
}

impl From<FilterCondition> for FilterTree {
    fn from(condition: FilterCondition) -> Self {
        FilterTree::Sequence(vec![FilterItem::Condition(condition)])
    }
}
