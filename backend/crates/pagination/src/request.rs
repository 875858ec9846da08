//! Page request parsing and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of items returned when the client omits `pageSize`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound applied to `pageSize` so responses stay bounded.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating page parameters or limits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `pageNumber` was zero, negative, or not a number.
    #[error("pageNumber must be a positive integer, got '{value}'")]
    InvalidPageNumber {
        /// Raw value supplied by the client.
        value: String,
    },
    /// `pageSize` was zero, negative, or not a number.
    #[error("pageSize must be a positive integer, got '{value}'")]
    InvalidPageSize {
        /// Raw value supplied by the client.
        value: String,
    },
    /// `sortOrder` was neither `asc` nor `desc`.
    #[error("sortOrder must be 'asc' or 'desc', got '{value}'")]
    InvalidSortOrder {
        /// Raw value supplied by the client.
        value: String,
    },
    /// Configured limits cannot produce a valid page size.
    #[error(
        "default page size {default_page_size} must be between 1 and the maximum {max_page_size}"
    )]
    InvalidLimits {
        /// Configured default page size.
        default_page_size: u32,
        /// Configured maximum page size.
        max_page_size: u32,
    },
}

impl PageRequestError {
    /// Query parameter responsible for the error, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPageNumber { .. } => Some("pageNumber"),
            Self::InvalidPageSize { .. } => Some("pageSize"),
            Self::InvalidSortOrder { .. } => Some("sortOrder"),
            Self::InvalidLimits { .. } => None,
        }
    }
}

/// Direction applied to the resolved sort selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest key first.
    #[default]
    Asc,
    /// Largest key first.
    Desc,
}

impl SortOrder {
    /// Whether results are returned largest key first.
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = PageRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim();
        if normalised.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if normalised.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(PageRequestError::InvalidSortOrder {
                value: value.to_owned(),
            })
        }
    }
}

/// Server-side bounds applied to every page request.
///
/// ## Invariants
/// - `1 <= default_page_size <= max_page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_page_size: u32,
    max_page_size: u32,
}

impl PageLimits {
    /// Build limits, rejecting combinations that cannot yield a valid page.
    ///
    /// # Errors
    /// Returns [`PageRequestError::InvalidLimits`] when the default is zero or
    /// exceeds the maximum.
    pub const fn new(default_page_size: u32, max_page_size: u32) -> Result<Self, PageRequestError> {
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(PageRequestError::InvalidLimits {
                default_page_size,
                max_page_size,
            });
        }
        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    /// Page size used when the client omits one.
    #[must_use]
    pub const fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Largest page size the server will honour.
    #[must_use]
    pub const fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    const fn clamp(&self, requested: u32) -> u32 {
        if requested > self.max_page_size {
            self.max_page_size
        } else {
            requested
        }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Raw page parameters as received from a query string.
///
/// Every field is optional text so malformed values reach validation instead
/// of failing inside the transport's deserialiser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// One-based page index.
    pub page_number: Option<String>,
    /// Requested number of items per page.
    pub page_size: Option<String>,
    /// Free-text filter applied to the entity's searchable fields.
    pub search_term: Option<String>,
    /// Name of the sort selector.
    pub sort_by: Option<String>,
    /// `asc` or `desc`, case-insensitive.
    pub sort_order: Option<String>,
}

impl PageParams {
    /// Validate the raw parameters into a [`PageRequest`].
    ///
    /// # Errors
    /// Returns a [`PageRequestError`] naming the first invalid parameter.
    pub fn into_request(self, limits: &PageLimits) -> Result<PageRequest, PageRequestError> {
        let page_number = match self.page_number {
            Some(raw) => parse_positive(&raw)
                .ok_or(PageRequestError::InvalidPageNumber { value: raw })?,
            None => 1,
        };
        let page_size = match self.page_size {
            Some(raw) => {
                parse_positive(&raw).ok_or(PageRequestError::InvalidPageSize { value: raw })?
            }
            None => limits.default_page_size(),
        };
        let sort_order = self
            .sort_order
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<SortOrder>())
            .transpose()?
            .unwrap_or_default();

        Ok(PageRequest::first(limits)
            .with_page(page_number, page_size, limits)
            .with_search_term(self.search_term)
            .with_sort(self.sort_by, sort_order))
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value > 0)
}

/// Validated page request consumed by [`crate::paginate`].
///
/// ## Invariants
/// - `page_number >= 1`.
/// - `1 <= page_size <= limits.max_page_size()`.
/// - `search_term` and `sort_by` are trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
    search_term: Option<String>,
    sort_by: Option<String>,
    sort_order: SortOrder,
}

impl PageRequest {
    /// First page at the default size, unfiltered and in default order.
    #[must_use]
    pub const fn first(limits: &PageLimits) -> Self {
        Self {
            page_number: 1,
            page_size: limits.default_page_size(),
            search_term: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }

    /// Select a page; zero values are raised to one and the size is clamped.
    #[must_use]
    pub fn with_page(mut self, page_number: u32, page_size: u32, limits: &PageLimits) -> Self {
        self.page_number = page_number.max(1);
        self.page_size = limits.clamp(page_size.max(1));
        self
    }

    /// Attach a search term; blank terms clear the filter.
    #[must_use]
    pub fn with_search_term(mut self, term: Option<String>) -> Self {
        self.search_term = normalise(term);
        self
    }

    /// Attach a sort selector name and direction.
    #[must_use]
    pub fn with_sort(mut self, sort_by: Option<String>, sort_order: SortOrder) -> Self {
        self.sort_by = normalise(sort_by);
        self.sort_order = sort_order;
        self
    }

    /// One-based page index.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Items per page after clamping.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Trimmed search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    /// Requested sort selector name, if any.
    #[must_use]
    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    /// Requested sort direction.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Number of filtered items skipped before this page starts.
    #[must_use]
    pub fn offset(&self) -> usize {
        let preceding = usize::try_from(self.page_number.saturating_sub(1)).unwrap_or(usize::MAX);
        let size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        preceding.saturating_mul(size)
    }
}

fn normalise(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
