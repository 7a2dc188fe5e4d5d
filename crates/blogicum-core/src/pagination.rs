//! Fixed-size, 1-based pagination for post listings.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Posts per listing page.
pub const PAGE_SIZE: u64 = 10;

/// A requested page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Page `page` at the fixed page size. Page numbers start at 1 and the
    /// resulting offset must fit a signed 64-bit SQL OFFSET.
    pub fn new(page: u64) -> Result<Self, DomainError> {
        let offset = page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(PAGE_SIZE))
            .filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            return Err(DomainError::PageOutOfRange(page));
        }
        Ok(Self {
            page,
            per_page: PAGE_SIZE,
        })
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PAGE_SIZE,
        }
    }
}

/// One page of results plus the size of the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    /// Number of pages; an empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Reject pages past the end of the listing.
    pub fn in_range(self) -> Result<Self, DomainError> {
        if self.page > self.num_pages() {
            return Err(DomainError::PageOutOfRange(self.page));
        }
        Ok(self)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, number: u64) -> Page<()> {
        Page {
            items: vec![],
            total,
            page: number,
            per_page: PAGE_SIZE,
        }
    }

    #[test]
    fn offset_calculation() {
        assert_eq!(PageRequest::new(1).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3).unwrap().offset(), 20);
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(matches!(
            PageRequest::new(0),
            Err(DomainError::PageOutOfRange(0))
        ));
    }

    #[test]
    fn huge_page_numbers_are_out_of_range() {
        assert!(matches!(
            PageRequest::new(u64::MAX),
            Err(DomainError::PageOutOfRange(u64::MAX))
        ));
        let last = i64::MAX as u64 / PAGE_SIZE + 1;
        assert!(PageRequest::new(last).is_ok());
        assert!(PageRequest::new(last + 1).is_err());
    }

    #[test]
    fn num_pages() {
        assert_eq!(page(0, 1).num_pages(), 1);
        assert_eq!(page(10, 1).num_pages(), 1);
        assert_eq!(page(11, 1).num_pages(), 2);
        assert_eq!(page(25, 1).num_pages(), 3);
    }

    #[test]
    fn has_next_prev() {
        assert!(page(30, 1).has_next());
        assert!(!page(30, 1).has_previous());
        assert!(page(30, 2).has_next());
        assert!(page(30, 2).has_previous());
        assert!(!page(30, 3).has_next());
    }

    #[test]
    fn empty_first_page_is_in_range() {
        assert!(page(0, 1).in_range().is_ok());
        assert!(page(0, 2).in_range().is_err());
        assert!(page(21, 3).in_range().is_ok());
        assert!(page(20, 3).in_range().is_err());
    }
}
