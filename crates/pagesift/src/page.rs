//! Pagination and the page envelope returned to callers.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::filter::FilterTree;
use crate::sort::SortConfig;

/// One page cut from an ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
}

/// Number of pages needed for `total` elements, 0 when there are none.
///
/// `size` must be positive.
pub fn total_pages(total: i64, size: i64) -> i64 {
    if total <= 0 || size <= 0 {
        0
    } else {
        (total - 1) / size + 1
    }
}

/// Cuts page `page` of `size` items out of an ordered sequence.
///
/// The slice is `[page * size, page * size + size)`, clipped to the
/// sequence. A page past the end is empty, as is a page whose offset does
/// not fit in an `i64`.
///
/// # Errors
///
/// [`QueryError::InvalidPageSize`] if `size <= 0`,
/// [`QueryError::InvalidPageIndex`] if `page < 0`.
pub fn paginate<T>(ordered: Vec<T>, page: i64, size: i64) -> Result<PageSlice<T>> {
    if size <= 0 {
        return Err(QueryError::InvalidPageSize(size));
    }
    if page < 0 {
        return Err(QueryError::InvalidPageIndex(page));
    }

    let total = ordered.len();
    let total_elements = i64::try_from(total).unwrap_or(i64::MAX);
    let total_pages = total_pages(total_elements, size);

    let start = page
        .checked_mul(size)
        .and_then(|offset| usize::try_from(offset).ok())
        .filter(|&offset| offset < total);
    let items = match start {
        Some(start) => {
            let len = usize::try_from(size).unwrap_or(usize::MAX);
            ordered.into_iter().skip(start).take(len).collect()
        }
        None => Vec::new(),
    };

    Ok(PageSlice {
        items,
        total_elements,
        total_pages,
    })
}

/// Page metadata echoed back with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Vec<String>>,
    #[serde(default)]
    pub sorts: Vec<SortConfig>,
    /// Always `null` in responses; the filter is not echoed back.
    #[serde(default)]
    pub filters: Option<FilterTree>,
}

/// A page of results together with its [`Paging`] metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedData<T> {
    pub data: Vec<T>,
    pub page: Paging,
}

impl<T> PagedData<T> {
    /// Projects every item, keeping the page metadata.
    ///
    /// ```
    /// use pagesift::{PageQuery, PagedData};
    /// use serde_json::json;
    ///
    /// let records = vec![json!({"id": "a"}), json!({"id": "b"})];
    /// let page = PageQuery::new().execute(&records).unwrap();
    /// let ids: PagedData<String> = page.map(|r| r["id"].as_str().unwrap_or_default().to_string());
    /// assert_eq!(ids.data, ["a", "b"]);
    /// ```
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PagedData<U> {
        PagedData {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
