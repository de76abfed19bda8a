//! Pagination.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Requested page, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// First page of the given size.
    pub fn first(page_size: usize) -> Self {
        Self::new(0, page_size)
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Rejects a zero page size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(25)
    }
}

/// Number of pages needed for `total` items. Zero when there are no items.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Clamp a page number into `[0, total_pages)`, or 0 when empty.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.min(total_pages(total, page_size).saturating_sub(1))
}

/// A page of items with pagination information.
///
/// `page` is the clamped page actually served, which can differ from the
/// requested one after the item count shrank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    page: usize,
    page_size: usize,
    total_count: usize,
}

impl<T> Page<T> {
    /// Returns the items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Zero-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items across all pages.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if a later page exists.
    pub fn has_more(&self) -> bool {
        self.page + 1 < self.total_pages()
    }
}

/// Slice `items` to the requested page, clamping the page number.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Result<Page<T>, ConfigError> {
    request.validate()?;
    let total_count = items.len();
    let page = clamp_page(request.page, total_count, request.page_size);
    let start = (page * request.page_size).min(total_count);
    let end = (start + request.page_size).min(total_count);
    Ok(Page {
        items: items[start..end].to_vec(),
        page,
        page_size: request.page_size,
        total_count,
    })
}
