//! Paginated, filtered view over the post collection.

use std::sync::Arc;

use crate::domain::{Page, Post, PostQuery, StatusFilter};
use crate::error::DomainError;
use crate::ports::PostGateway;

/// Largest page the listing will request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Listing state. Every fetch is a fresh query; nothing is cached.
pub struct PostListing {
    gateway: Arc<dyn PostGateway>,
    query: PostQuery,
}

impl PostListing {
    pub fn new(gateway: Arc<dyn PostGateway>) -> Self {
        Self {
            gateway,
            query: PostQuery::default(),
        }
    }

    pub fn query(&self) -> &PostQuery {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), DomainError> {
        if page == 0 {
            return Err(DomainError::Validation("Pages start at 1".to_string()));
        }
        self.query.page = page;
        Ok(())
    }

    /// Change the page size. A different size returns to page 1.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), DomainError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(DomainError::Validation(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if page_size != self.query.page_size {
            self.query.page_size = page_size;
            self.query.page = 1;
        }
        Ok(())
    }

    /// Change the status filter. A different filter returns to page 1.
    pub fn set_status(&mut self, status: StatusFilter) {
        if status != self.query.status {
            self.query.status = status;
            self.query.page = 1;
        }
    }

    /// Change the search term. Blank means no search. A different term returns to page 1.
    pub fn set_search(&mut self, term: Option<&str>) {
        let term = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if term != self.query.search {
            self.query.search = term;
            self.query.page = 1;
        }
    }

    pub async fn fetch(&self) -> Result<Page<Post>, DomainError> {
        let page = self.gateway.list_posts(&self.query).await?;
        tracing::debug!(
            page = page.page,
            items = page.items.len(),
            total = page.total,
            "Post page loaded"
        );
        Ok(page)
    }
}
