//! Append-only result collection for one search category
//!
//! Items arrive in pages and keep their arrival order; re-fetched ids are
//! never reintroduced. Growth stops at the optional cap or when the cursor
//! is exhausted, whichever comes first.

use std::collections::HashSet;

use crate::cursor::PaginationCursor;
use crate::models::CatalogEntity;

/// One category's accumulated results plus its continuation state.
#[derive(Debug, Clone)]
pub struct CategoryCollection<T> {
    items: Vec<T>,
    seen: HashSet<String>,
    cursor: PaginationCursor,
    cap: Option<usize>,
    loading: bool,
}

impl<T: CatalogEntity> CategoryCollection<T> {
    /// Creates an empty collection. The cursor starts exhausted; the first
    /// page's envelope supplies the real one.
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: PaginationCursor::exhausted(),
            cap,
            loading: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn at_cap(&self) -> bool {
        self.cap.is_some_and(|cap| self.items.len() >= cap)
    }

    /// Whether a further page may be requested: nothing in flight, cursor
    /// not exhausted, cap not reached.
    pub fn can_request_more(&self) -> bool {
        !self.loading && !self.cursor.is_exhausted() && !self.at_cap()
    }

    /// Appends a fetched page and replaces the cursor with the envelope's
    /// new token. Already-seen ids are skipped; appending stops at the cap.
    pub(crate) fn append_page(&mut self, items: Vec<T>, next: Option<String>) {
        for item in items {
            if self.at_cap() {
                break;
            }
            if self.seen.insert(item.entity_id()) {
                self.items.push(item);
            }
        }
        self.cursor = PaginationCursor::from_next(next);
    }
}
