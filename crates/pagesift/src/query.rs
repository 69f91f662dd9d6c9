//! List requests and their execution.
//!
//! The [`PageQuery`] struct is the decoded list request (filters, sorts,
//! page and size) with a fluent builder API and methods for executing it
//! against record collections.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::compile::Predicate;
use crate::error::{QueryError, Result};
use crate::filter::FilterTree;
use crate::op::FilterOperator;
use crate::options::QueryOptions;
use crate::page::{paginate, PagedData, Paging};
use crate::record::{Record, Schema};
use crate::sort::{SortConfig, SortPlan};
use crate::validate::validate;

/// A list request: an optional filter, sort keys and a page.
///
/// Execution runs validate, compile, filter, stable sort and paginate, in
/// that order. Without a filter every record matches. Every error except a
/// per-record type mismatch is raised before any record is looked at.
///
/// # Example
///
/// ```
/// use pagesift::{FilterCondition, FilterOperator, PageQuery};
/// use serde_json::json;
///
/// let parcels = vec![
///     json!({"id": 1, "status": "A", "weight": 3}),
///     json!({"id": 2, "status": "B", "weight": 8}),
///     json!({"id": 3, "status": "A", "weight": 9}),
/// ];
///
/// let page = PageQuery::new()
///     .filter(FilterCondition::new("status", FilterOperator::Equals, "a"))
///     .sort_desc("weight")
///     .size(10)
///     .execute(&parcels)
///     .unwrap();
///
/// assert_eq!(page.page.total_elements, 2);
/// assert_eq!(page.data[0]["id"], 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterTree>,
    #[serde(default)]
    pub sorts: Vec<SortConfig>,
    #[serde(default)]
    pub page: i64,
    /// `None` uses the configured default page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Vec<String>>,
}

impl PageQuery {
    /// Creates a request for the first page of all records.
    pub fn new() -> Self {
        PageQuery::default()
    }

    /// Decodes a JSON list request.
    ///
    /// Operator tokens are resolved before the request is decoded, so an
    /// unknown token is reported as such wherever it is nested.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnknownOperator`] for an unresolvable operator token,
    /// [`QueryError::Decode`] for malformed JSON and values of the wrong
    /// JSON kind.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Json = serde_json::from_str(json)?;
        if let Some(filters) = raw.get("filters") {
            resolve_operator_tokens(filters)?;
        }
        Ok(serde_json::from_value(raw)?)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Sets the filter, replacing any previous one.
    pub fn filter(mut self, filter: impl Into<FilterTree>) -> Self {
        self.filters = Some(filter.into());
        self
    }

    /// Adds a sort key. Earlier keys take precedence.
    pub fn sort(mut self, sort: SortConfig) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn sort_asc(self, field: &str) -> Self {
        self.sort(SortConfig::asc(field))
    }

    pub fn sort_desc(self, field: &str) -> Self {
        self.sort(SortConfig::desc(field))
    }

    /// Sets the zero-based page index.
    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the caller's selection, echoed back in the page metadata.
    pub fn selected<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Validates and compiles the filter against a schema.
    ///
    /// Returns a predicate matching everything when there is no filter.
    pub fn predicate(&self, schema: &Schema) -> Result<Predicate> {
        match &self.filters {
            Some(tree) => validate(tree)?.compile(schema),
            None => Ok(Predicate::always()),
        }
    }

    /// Runs the request with the schema of the record type and default
    /// [`QueryOptions`].
    pub fn execute<'a, T: Record>(&self, records: &'a [T]) -> Result<PagedData<&'a T>> {
        self.execute_with(records, &T::schema(), &QueryOptions::default())
    }

    /// Runs the request with an explicit schema and default [`QueryOptions`].
    pub fn execute_with_schema<'a, T: Record>(
        &self,
        records: &'a [T],
        schema: &Schema,
    ) -> Result<PagedData<&'a T>> {
        self.execute_with(records, schema, &QueryOptions::default())
    }

    /// Runs the request.
    ///
    /// The source is never modified; the page holds references into it.
    pub fn execute_with<'a, T: Record>(
        &self,
        records: &'a [T],
        schema: &Schema,
        options: &QueryOptions,
    ) -> Result<PagedData<&'a T>> {
        let size = self.size.unwrap_or(options.default_page_size);
        options.check_size(size)?;
        if self.page < 0 {
            return Err(QueryError::InvalidPageIndex(self.page));
        }
        options.check_source(records.len())?;

        let predicate = self.predicate(schema)?;
        let mut matched: Vec<&'a T> = records
            .iter()
            .filter(|record| predicate.matches(*record))
            .collect();
        debug!(
            dialect = self.filters.as_ref().map_or("none", FilterTree::dialect),
            total = records.len(),
            matched = matched.len(),
            "filtered records"
        );

        SortPlan::new(&self.sorts, schema).sort(&mut matched);

        let slice = paginate(matched, self.page, size)?;
        debug!(
            page = self.page,
            size,
            total_elements = slice.total_elements,
            total_pages = slice.total_pages,
            returned = slice.items.len(),
            "page ready"
        );

        Ok(PagedData {
            data: slice.items,
            page: Paging {
                page: self.page,
                size,
                total_elements: slice.total_elements,
                total_pages: slice.total_pages,
                selected: self.selected.clone(),
                sorts: self.sorts.clone(),
                filters: None,
            },
        })
    }
}

/// Resolves every condition's `operator` token in a raw filter tree.
///
/// Connective items (`"type": "operator"`) may carry their logic under an
/// `operator` key and are skipped. Non-string tokens are left to the decoder.
fn resolve_operator_tokens(node: &Json) -> Result<()> {
    match node {
        Json::Array(items) => items.iter().try_for_each(resolve_operator_tokens),
        Json::Object(fields) => {
            let connective = fields.get("type").and_then(Json::as_str) == Some("operator");
            if let (false, Some(Json::String(token))) = (connective, fields.get("operator")) {
                FilterOperator::resolve(token)?;
            }
            fields.values().try_for_each(resolve_operator_tokens)
        }
        _ => Ok(()),
    }
}
