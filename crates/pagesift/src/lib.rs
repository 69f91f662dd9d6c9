//! Pagesift - filter, sort and paginate record collections from dynamic
//! filter trees.
//!
//! Pagesift takes a list request as sent by a client (a filter tree, sort
//! keys and a page) and runs it against an in-memory record source:
//!
//! - Two filter dialects: uniform-logic groups and pairwise operator
//!   sequences, arbitrarily nested
//! - Thirteen operators with canonical names and short aliases
//! - Structural validation before any record is read
//! - Declared field types, so timestamps stored as text compare as instants
//! - Stable multi-key sorting with nulls last
//! - A page envelope with total counts
//!
//! # Quick Start
//!
//! ```rust
//! use pagesift::PageQuery;
//! use serde_json::json;
//!
//! let parcels = vec![
//!     json!({"id": 1, "status": "A", "weight": 3}),
//!     json!({"id": 2, "status": "A", "weight": 9}),
//!     json!({"id": 3, "status": "B", "weight": 7}),
//! ];
//!
//! let request = r#"{
//!     "filters": [
//!         {"type": "condition", "field": "status", "operator": "eq", "value": "A"},
//!         {"type": "operator", "logic": "OR"},
//!         {"type": "condition", "field": "weight", "operator": "gt", "value": 5}
//!     ],
//!     "sorts": [{"field": "weight", "direction": "DESC"}],
//!     "page": 0,
//!     "size": 2
//! }"#;
//!
//! let page = PageQuery::from_json(request)?.execute(&parcels)?;
//! assert_eq!(page.page.total_elements, 3);
//! assert_eq!(page.page.total_pages, 2);
//! assert_eq!(page.data[0]["id"], 2);
//! # Ok::<(), pagesift::QueryError>(())
//! ```
//!
//! # Filter Semantics
//!
//! A **group** applies one logic to all of its children:
//!
//! ```json
//! {"logic": "AND", "conditions": [
//!     {"field": "status", "operator": "EQUALS", "value": "A"},
//!     {"logic": "OR", "conditions": [...]}
//! ]}
//! ```
//!
//! A **sequence** places an explicit operator between every two operands
//! and is evaluated strictly left to right. There is no precedence:
//!
//! ```text
//! [a, OR, b, AND, c]  ==  (a OR b) AND c
//! ```
//!
//! Nested sequence groups evaluate to a single boolean in their parent.
//! Empty groups and empty sequences match every record.
//!
//! # Operators
//!
//! | Operator | Alias | Value |
//! |----------|-------|-------|
//! | `EQUALS`, `NOT_EQUALS` | `eq`, `ne` | scalar |
//! | `CONTAINS`, `STARTS_WITH`, `ENDS_WITH` | `contains`, `startswith`, `endswith` | string |
//! | `GREATER_THAN`, `GREATER_OR_EQUAL` | `gt`, `gte` | scalar |
//! | `LESS_THAN`, `LESS_OR_EQUAL` | `lt`, `lte` | scalar |
//! | `IN` | `in` | list |
//! | `BETWEEN` | `between` | two bounds, inclusive |
//! | `IS_NULL`, `IS_NOT_NULL` | `isnull`, `isnotnull` | none |
//!
//! String comparisons ignore case unless the condition sets
//! `caseSensitive`. A record value that cannot be compared with its
//! operator makes that condition false for that record.

mod compile;
mod condition;
mod error;
mod filter;
mod op;
mod options;
mod page;
mod query;
mod record;
mod sort;
mod validate;
mod value;

// Re-export public API
pub use compile::Predicate;
pub use condition::{FilterCondition, Operand};
pub use error::{QueryError, Result};
pub use filter::{FilterGroup, FilterItem, FilterTree, GroupEntry, Logic};
pub use op::{FilterOperator, ValueArity};
pub use options::{QueryOptions, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, RECOMMENDED_MAX_RECORDS};
pub use page::{paginate, total_pages, PageSlice, PagedData, Paging};
pub use query::PageQuery;
pub use record::{Record, Schema, ToValue};
pub use sort::{compare_values, Direction, SortConfig, SortPlan};
pub use validate::{validate, ValidatedFilter};
pub use value::{FieldType, Number, Scalar, Timestamp, Value};

#[cfg(feature = "macros")]
pub use pagesift_macros::Record;
