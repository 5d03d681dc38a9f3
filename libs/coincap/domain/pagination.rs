/// Assets requested per page
pub const PAGE_SIZE: usize = 25;

/// Page shown at startup
pub const FIRST_PAGE: usize = 1;

/// Page cursor plus the size of the last page that arrived
///
/// `next` is available only while the last page was full, `previous`
/// only above the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    last_len: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: FIRST_PAGE,
            page_size: page_size.max(1),
            last_len: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn last_len(&self) -> usize {
        self.last_len
    }

    /// Offset sent to the API for the current page
    pub fn offset(&self) -> usize {
        offset_for(self.page, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > FIRST_PAGE
    }

    pub fn has_next(&self) -> bool {
        self.last_len >= self.page_size
    }

    /// Move forward one page. Returns the new page, or `None` when disabled.
    pub fn next(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        self.page += 1;
        Some(self.page)
    }

    /// Move back one page. Returns the new page, or `None` when disabled.
    pub fn previous(&mut self) -> Option<usize> {
        if !self.has_previous() {
            return None;
        }
        self.page -= 1;
        Some(self.page)
    }

    pub fn record_page_len(&mut self, len: usize) {
        self.last_len = len;
    }
}

pub fn offset_for(page: usize, page_size: usize) -> usize {
    page.saturating_mul(page_size)
}
