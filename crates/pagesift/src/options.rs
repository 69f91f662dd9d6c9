//! Query limits.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Page size used when a request does not give one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size accepted by default.
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 1000;

/// Largest record source queried in memory by default. Larger collections
/// should be filtered by their store first.
pub const RECOMMENDED_MAX_RECORDS: usize = 100_000;

/// Limits applied by [`PageQuery::execute_with`](crate::PageQuery::execute_with).
///
/// Every field has a default, so a partial config file is fine:
///
/// ```
/// use pagesift::QueryOptions;
///
/// let options: QueryOptions = serde_json::from_str(r#"{"maxPageSize": 50}"#).unwrap();
/// assert_eq!(options.default_page_size, 20);
/// assert_eq!(options.max_page_size, Some(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    pub default_page_size: i64,
    /// `None` disables the limit.
    pub max_page_size: Option<i64>,
    /// `None` disables the limit.
    pub max_records: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: Some(DEFAULT_MAX_PAGE_SIZE),
            max_records: Some(RECOMMENDED_MAX_RECORDS),
        }
    }
}

impl QueryOptions {
    /// Options without upper limits.
    pub fn unbounded() -> Self {
        QueryOptions {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            max_records: None,
        }
    }

    /// Checks a requested page size against the limits.
    pub fn check_size(&self, size: i64) -> Result<()> {
        match self.max_page_size {
            _ if size <= 0 => Err(QueryError::InvalidPageSize(size)),
            Some(max) if size > max => Err(QueryError::InvalidPageSize(size)),
            _ => Ok(()),
        }
    }

    /// Checks the length of a record source against the limits.
    pub fn check_source(&self, len: usize) -> Result<()> {
        match self.max_records {
            Some(max) if len > max => Err(QueryError::SourceTooLarge { len, max }),
            _ => Ok(()),
        }
    }
}
