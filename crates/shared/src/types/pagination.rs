//! Pagination types for history queries.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Both the page number and the page size must be at least 1.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.page >= 1 && self.page_size >= 1
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of a paginated result.
///
/// `count` is the number of items actually returned on this page, which is
/// smaller than the page size on the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Current page number.
    pub page: u32,
    /// Last page number (`ceil(total / page_size)`, 0 when there are no rows).
    pub last_page: u64,
    /// Number of items on this page.
    pub count: usize,
    /// The items in the current page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a page from the fetched items and the total row count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let last_page = total.div_ceil(u64::from(request.page_size.max(1)));

        Self {
            page: request.page,
            last_page,
            count: items.len(),
            items,
        }
    }

    /// Maps the items of the page, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            last_page: self.last_page,
            count: self.count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
