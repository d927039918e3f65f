use serde::{Deserialize, Serialize};

use super::PostStatus;

/// Status filter for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PostStatus),
}

impl StatusFilter {
    /// Value sent to the backend; `None` means no filter.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(status.as_str()),
        }
    }

    pub fn matches(&self, status: PostStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") || s.is_empty() {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// One page request against the post collection. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub page_size: u32,
    pub status: StatusFilter,
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            status: StatusFilter::All,
            search: None,
        }
    }
}

/// A page of results with the collection totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}
