//! Fixed-size pagination over the active dataset.
//!
//! Pages are 1-based. Out-of-range requests are clamped to the nearest valid
//! page rather than rejected, and an empty dataset still has exactly one
//! (empty) page so that a consumer always has a page to show.
//!
//! # Example
//!
//! ```
//! use greenwatch_core::paginate::{paginate, total_pages};
//!
//! assert_eq!(total_pages(10, 6), 2);
//! assert_eq!(total_pages(0, 6), 1);
//!
//! let page = paginate(&[], 6, 3);
//! assert_eq!(page.current_page, 1);
//! assert!(page.visible.is_empty());
//! ```

use greenwatch_types::Reading;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// The paginator's view over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    /// Items per page.
    pub page_size: usize,
    /// Current page, 1-based, always within `1..=total_pages`.
    pub current_page: usize,
    /// Number of pages; 1 for an empty dataset.
    pub total_pages: usize,
    /// Number of items in the whole dataset.
    pub total_items: usize,
    /// The readings on the current page.
    pub visible: Vec<Reading>,
}

impl PageState {
    /// The single empty page.
    pub fn empty(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            visible: Vec::new(),
        }
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Whether the current page shows nothing.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// 1-based inclusive positions of the visible items within the dataset,
    /// for "showing 7-12 of 40" style labels. `None` when nothing is visible.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.visible.is_empty() {
            return None;
        }
        let first = (self.current_page - 1) * self.page_size + 1;
        Some((first, first + self.visible.len() - 1))
    }
}

/// Number of pages needed for `len` items, never less than 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page into `1..=total_pages`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Slice `dataset` into the requested page.
///
/// A `page_size` of zero is treated as 1.
pub fn paginate(dataset: &[Reading], page_size: usize, requested_page: usize) -> PageState {
    let page_size = page_size.max(1);
    let total = total_pages(dataset.len(), page_size);
    let page = clamp_page(requested_page, total);

    let start = ((page - 1) * page_size).min(dataset.len());
    let end = (start + page_size).min(dataset.len());

    PageState {
        page_size,
        current_page: page,
        total_pages: total,
        total_items: dataset.len(),
        visible: dataset[start..end].to_vec(),
    }
}

/// Tracks the current page for a fixed page size.
///
/// The paginator does not hold the dataset; callers pass the current length
/// (for navigation) or the dataset itself (to materialize a page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// Create a paginator at page 1. A `page_size` of zero is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Items per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current page, 1-based.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Go back to page 1, as happens whenever the dataset changes identity.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Jump to `page`, clamped for a dataset of `len` items. Returns the
    /// page actually selected.
    pub fn go_to(&mut self, page: usize, len: usize) -> usize {
        self.current_page = clamp_page(page, total_pages(len, self.page_size));
        self.current_page
    }

    /// Advance one page, stopping at the last.
    pub fn next(&mut self, len: usize) -> usize {
        self.go_to(self.current_page.saturating_add(1), len)
    }

    /// Go back one page, stopping at the first.
    pub fn prev(&mut self, len: usize) -> usize {
        self.go_to(self.current_page.saturating_sub(1), len)
    }

    /// Re-clamp the current page after the dataset length changed.
    pub fn clamp_to(&mut self, len: usize) {
        self.go_to(self.current_page, len);
    }

    /// Materialize the current page of `dataset`.
    pub fn page(&self, dataset: &[Reading]) -> PageState {
        paginate(dataset, self.page_size, self.current_page)
    }
}
