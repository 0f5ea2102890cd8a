//! Fixed-size page windows over a filtered view.
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// 1-based page cursor. Every method that depends on the view takes the
/// view's current length, so the cursor stays valid as the view changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self { page: 1, page_size: page_size.max(1) }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    /// Index range of the current window within a view of `len` records.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn next(&mut self, len: usize) {
        if self.page < self.total_pages(len) {
            self.page += 1;
        }
    }

    /// Jump to `page`; out-of-range pages are ignored. Returns whether the
    /// page changed.
    pub fn jump(&mut self, page: usize, len: usize) -> bool {
        if page < 1 || page > self.total_pages(len) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pull the page back into range after the view shrank.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.total_pages(len));
    }

    /// Change the window size and clamp to the new page count.
    pub fn set_page_size(&mut self, page_size: usize, len: usize) {
        self.page_size = page_size.max(1);
        self.clamp(len);
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
