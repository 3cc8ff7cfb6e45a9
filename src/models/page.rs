use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Posts returned per listing page.
pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Newest,
    Views,
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Newest
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default)]
    pub sort: SortKey,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct PageResult<T> {
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "totalRowCount")]
    pub total_row_count: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub items: Vec<T>,
}

/// Resolved offset/limit window plus the derived page count. Pure data,
/// independent of sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Converts a 1-indexed page number into an offset/limit window.
///
/// A page number past the last page is not an error here; the resulting
/// window simply selects nothing. Non-positive page numbers are a caller
/// contract violation and are rejected rather than clamped, since silently
/// normalizing hides caller bugs.
pub fn resolve_page(page: i64, page_size: i64, total_row_count: i64) -> Result<PageWindow> {
    if page <= 0 {
        return Err(Error::Validation("page must be a positive integer".to_string()));
    }

    let total_pages = if total_row_count == 0 {
        0
    } else {
        (total_row_count + page_size - 1) / page_size
    };

    Ok(PageWindow {
        offset: (page - 1) * page_size,
        limit: page_size,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_yield_zero_pages() {
        let w = resolve_page(1, PAGE_SIZE, 0).unwrap();
        assert_eq!(w.total_pages, 0);
        assert_eq!(w.offset, 0);
        assert_eq!(w.limit, PAGE_SIZE);
    }

    #[test]
    fn partial_last_page_rounds_up() {
        let w = resolve_page(3, 10, 23).unwrap();
        assert_eq!(w.total_pages, 3);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        let w = resolve_page(1, 10, 30).unwrap();
        assert_eq!(w.total_pages, 3);
    }

    #[test]
    fn page_beyond_end_is_not_an_error() {
        let w = resolve_page(4, 10, 23).unwrap();
        assert_eq!(w.offset, 30);
        assert_eq!(w.total_pages, 3);
    }

    #[test]
    fn non_positive_page_is_rejected() {
        assert!(matches!(
            resolve_page(0, 10, 5),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_page(-2, 10, 5),
            Err(Error::Validation(_))
        ));
    }
}
