//! # Pagination
//!
//! Client-side paging over a list that is already fully loaded. Nothing here
//! talks to the record service: the table controllers replace their list
//! wholesale and call [`recompute`] again.
//!
//! The state is three integers. [`recompute`] is a pure function of
//! `(list, page_size, page_number)`: it derives `total_records` from the list,
//! clamps the page number and hands back the visible slice. Calling it twice
//! with the same inputs yields the same output.
//!
//! ## Clamping
//!
//! ```text
//! total_pages = ceil(total_records / page_size)
//! page <= 1            -> 1
//! page >= total_pages  -> total_pages   (never below 1)
//! ```
//!
//! An empty list has zero pages; the page number still floors at 1 and the
//! visible slice is empty.

use crate::error::{CrmError, Result};

/// Page sizes offered by the tables. The first one is the initial size.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_size: usize,
    pub page_number: usize,
    pub total_records: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE_OPTIONS[0],
            page_number: 1,
            total_records: 0,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn total_pages(&self) -> usize {
        self.total_records.div_ceil(self.page_size)
    }

    /// Applies the clamp rule to `page_number`.
    pub fn clamped(self) -> Self {
        let total_pages = self.total_pages();
        let page_number = if self.page_number <= 1 {
            1
        } else if self.page_number >= total_pages {
            total_pages.max(1)
        } else {
            self.page_number
        };
        Self {
            page_number,
            ..self
        }
    }

    pub fn first(self) -> Self {
        Self {
            page_number: 1,
            ..self
        }
        .clamped()
    }

    pub fn previous(self) -> Self {
        Self {
            page_number: self.page_number.saturating_sub(1),
            ..self
        }
        .clamped()
    }

    pub fn next(self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            ..self
        }
        .clamped()
    }

    pub fn last(self) -> Self {
        Self {
            page_number: self.total_pages(),
            ..self
        }
        .clamped()
    }

    pub fn with_page_size(self, page_size: usize) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self { page_size, ..self }.clamped())
    }

    pub fn can_go_first(&self) -> bool {
        self.page_number != 1
    }

    pub fn can_go_previous(&self) -> bool {
        self.can_go_first()
    }

    /// False only on the last page. An empty list has no last page, so this
    /// stays true there; pressing last just clamps back to 1.
    pub fn can_go_last(&self) -> bool {
        self.page_number != self.total_pages()
    }

    pub fn can_go_next(&self) -> bool {
        self.can_go_last()
    }

    /// Index range of the current page, intersected with the list bounds.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self
            .page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(self.total_records);
        let end = self
            .page_number
            .saturating_mul(self.page_size)
            .min(self.total_records);
        start..end
    }
}

fn validate_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 {
        return Err(CrmError::Validation(
            "Page size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Clamps `state` against `list` and returns the records on the current page.
pub fn recompute<T>(list: &[T], state: PaginationState) -> (&[T], PaginationState) {
    let state = PaginationState {
        total_records: list.len(),
        ..state
    }
    .clamped();
    (&list[state.visible_range()], state)
}
