//! Page requests and page results for the active-listing browse.

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};

/// Page used when the caller does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on page size unless configured otherwise.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, filling in defaults for missing values.
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_page_size: u32) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(default_page_size),
        }
    }

    /// Check bounds against `max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if `page < 1` or `page_size` is outside `1..=max_page_size`.
    pub fn validate(self, max_page_size: u32) -> Result<Self> {
        if self.page < 1 {
            return Err(MarketError::validation("page must be at least 1"));
        }
        if self.page_size < 1 || self.page_size > max_page_size {
            return Err(MarketError::validation(format!(
                "page_size must be between 1 and {max_page_size}"
            )));
        }
        Ok(self)
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Rows to take.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, already ordered
    pub items: Vec<T>,
    /// Items across all pages
    pub total_items: u64,
    /// `ceil(total_items / page_size)`, zero when empty
    pub total_pages: u64,
    /// Echo of the requested page
    pub page: u32,
    /// Echo of the requested page size
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Assemble a page from a slice query and a total count.
    #[must_use]
    pub fn new(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_items,
            total_pages: total_items.div_ceil(u64::from(request.page_size.max(1))),
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Transform every item, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::new(None, None, DEFAULT_PAGE_SIZE);
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 50);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(PageRequest { page: 0, page_size: 10 }.validate(100).is_err());
        assert!(PageRequest { page: 1, page_size: 0 }.validate(100).is_err());
        assert!(PageRequest { page: 1, page_size: 101 }.validate(100).is_err());
        assert!(PageRequest { page: 1, page_size: 100 }.validate(100).is_ok());
    }

    #[test]
    fn test_offset() {
        let request = PageRequest { page: 3, page_size: 10 };
        assert_eq!(request.offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest { page: 3, page_size: 10 };
        let page = Page::new(vec![1, 2, 3, 4, 5], 25, request);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], 0, request);
        assert_eq!(empty.total_pages, 0);
    }

    proptest! {
        #[test]
        fn prop_total_pages_covers_all_items(total in 0u64..10_000, size in 1u32..=100) {
            let page: Page<()> = Page::new(vec![], total, PageRequest { page: 1, page_size: size });
            let size = u64::from(size);
            prop_assert!(page.total_pages * size >= total);
            prop_assert!(page.total_pages == 0 || (page.total_pages - 1) * size < total);
        }
    }
}
