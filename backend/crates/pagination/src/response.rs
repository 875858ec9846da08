//! Paginated response envelope.

use serde::{Deserialize, Serialize};

/// One page of results plus the totals a client needs to navigate.
///
/// ## Invariants
/// - `total_pages == ceil(total_items / page_size)`, so an empty collection
///   reports zero pages.
/// - `data.len() <= page_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    /// Items on this page in resolved sort order.
    pub data: Vec<T>,
    /// One-based index of this page.
    pub page_number: u32,
    /// Page size the server applied.
    pub page_size: u32,
    /// Number of items matching the filter across all pages.
    pub total_items: u64,
    /// Number of pages needed to cover `total_items`.
    pub total_pages: u64,
}

impl<T> Paged<T> {
    /// Build an envelope and derive `total_pages` from the totals.
    ///
    /// # Examples
    /// ```
    /// use pagination::Paged;
    ///
    /// let page = Paged::new(vec!["a", "b"], 1, 2, 5);
    /// assert_eq!(page.total_pages, 3);
    /// ```
    #[must_use]
    pub fn new(data: Vec<T>, page_number: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(page_size.max(1)));
        Self {
            data,
            page_number,
            page_size,
            total_items,
            total_pages,
        }
    }

    /// Transform every item while keeping the paging totals.
    #[must_use]
    pub fn map<U, F>(self, transform: F) -> Paged<U>
    where
        F: FnMut(T) -> U,
    {
        Paged {
            data: self.data.into_iter().map(transform).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
