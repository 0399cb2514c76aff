//! Query parameters and pagination utilities
//!
//! The listing is read newest-first. A request names a 1-indexed page and an
//! optional `limit`; [`Paginator::compute_window`] turns those into the
//! `[start, end)` slice of the ordered collection plus navigation metadata.

use serde::{Deserialize, Serialize};

/// Limit used when the request omits `limit` or supplies an unusable value
pub const DEFAULT_LIMIT: usize = 10;

/// Largest accepted `limit`
pub const MAX_LIMIT: usize = 100;

/// Query parameters accepted by the listing routes
///
/// `limit` stays a raw string so that malformed values (`3.14`, `abc`) fall
/// back to the default instead of rejecting the request.
///
/// # Example
/// ```text
/// GET /?limit=20
/// GET /page/3?limit=50
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// Page-window calculator
///
/// Pure computation: the caller supplies the total count at call time and
/// nothing is cached between requests.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    default_limit: usize,
    max_limit: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl Paginator {
    /// Create a paginator with explicit bounds
    ///
    /// `max_limit` is capped at [`MAX_LIMIT`]. A default outside
    /// `[1, max_limit]` is replaced by [`DEFAULT_LIMIT`].
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.clamp(1, MAX_LIMIT);
        let default_limit = if (1..=max_limit).contains(&default_limit) {
            default_limit
        } else {
            DEFAULT_LIMIT.min(max_limit)
        };
        Self {
            default_limit,
            max_limit,
        }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Resolve the requested limit
    ///
    /// Anything that is not an integer in `[1, max_limit]` yields the default;
    /// out-of-range values are not clamped to the nearest bound.
    pub fn effective_limit(&self, requested: Option<&str>) -> usize {
        requested
            .map(str::trim)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|limit| *limit >= 1 && *limit <= self.max_limit as i64)
            .map(|limit| limit as usize)
            .unwrap_or(self.default_limit)
    }

    /// Zero-based page index; pages below 1 are treated as page 1
    pub fn page_index(requested_page: i64) -> usize {
        requested_page.saturating_sub(1).max(0) as usize
    }

    /// Compute the window and navigation metadata for one page
    pub fn compute_window(
        &self,
        requested_page: i64,
        requested_limit: Option<&str>,
        total_count: usize,
    ) -> PageWindow {
        let limit = self.effective_limit(requested_limit);
        let page_index = Self::page_index(requested_page);

        let start = page_index.saturating_mul(limit);
        let end = start.saturating_add(limit);

        let total_pages = if total_count == 0 {
            1
        } else {
            (total_count - 1) / limit + 1
        };

        tracing::debug!(
            page = page_index + 1,
            limit,
            total_count,
            start,
            end,
            "computed page window"
        );

        PageWindow {
            start,
            end,
            effective_limit: limit,
            effective_page: page_index + 1,
            total_count,
            total_pages,
            has_next: page_index < total_pages - 1,
            has_prev: page_index > 0,
        }
    }
}

/// The slice `[start, end)` selected for one page, plus navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub effective_limit: usize,
    /// 1-indexed page actually served
    pub effective_page: usize,
    pub total_count: usize,
    /// Always at least 1, even for an empty collection
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageWindow {
    pub fn meta(&self) -> PaginationMeta {
        PaginationMeta {
            page: self.effective_page,
            limit: self.effective_limit,
            total: self.total_count,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The entries on this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items at the time of the count
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}
