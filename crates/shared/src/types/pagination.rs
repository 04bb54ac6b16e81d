//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Upper bound on `per_page`.
    pub const MAX_PER_PAGE: u32 = 100;

    /// Builds a request from optional query values, clamped to valid bounds.
    #[must_use]
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page).max(1),
            per_page: per_page
                .unwrap_or_else(default_per_page)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Returns the limit for database queries, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.clamp(1, Self::MAX_PER_PAGE))
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };

        Self {
            data,
            meta: PageMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 20, 0, 20)]
    #[case(3, 10, 20, 10)]
    #[case(0, 10, 0, 10)]
    #[case(2, 500, 100, 100)]
    #[case(1, 0, 0, 1)]
    fn test_offset_and_limit(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] offset: u64,
        #[case] limit: u64,
    ) {
        let req = PageRequest { page, per_page };
        assert_eq!(req.offset(), offset);
        assert_eq!(req.limit(), limit);
    }

    #[test]
    fn test_from_query_defaults_and_clamps() {
        let req = PageRequest::from_query(None, None);
        assert_eq!((req.page, req.per_page), (1, 20));

        let req = PageRequest::from_query(Some(0), Some(1000));
        assert_eq!((req.page, req.per_page), (1, 100));
    }

    #[rstest]
    #[case(0, 20, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(95, 10, 10)]
    fn test_total_pages(#[case] total: u64, #[case] per_page: u32, #[case] pages: u32) {
        let resp: PageResponse<()> = PageResponse::new(vec![], 1, per_page, total);
        assert_eq!(resp.meta.total_pages, pages);
    }
}
