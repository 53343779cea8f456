use serde_json::Value;

use crate::models::{Cursor, Page};

/// Ordered page sequence for an infinite query.
///
/// Invariant: `pages[i]` was fetched with `page_params[i]`; index 0 is the
/// first page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paginated {
    pub pages: Vec<Page>,
    pub page_params: Vec<Cursor>,
}

impl Paginated {
    pub fn first(page: Page) -> Self {
        Self {
            pages: vec![page],
            page_params: vec![0],
        }
    }

    /// Cursor for the next page, if the last fetched page announced one.
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.pages.last().and_then(|p| p.next_cursor)
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// Appends a freshly fetched page and the cursor it was fetched with.
    pub fn push_page(&mut self, page: Page, param: Cursor) {
        self.pages.push(page);
        self.page_params.push(param);
    }

    /// Replaces the page at `index` wholesale; patches rebuild a page and
    /// swap it in rather than mutate items in place. Out-of-bounds indices
    /// are a silent no-op.
    pub fn replace_page(&mut self, index: usize, page: Page) {
        if index < self.pages.len() {
            self.pages[index] = page;
        }
    }

    /// Rebuilds the page at `index`, applying `patch` to each item. A wrong
    /// index leaves the entry untouched.
    pub fn map_page_items(&mut self, index: usize, mut patch: impl FnMut(&mut Value)) {
        let Some(page) = self.pages.get(index) else {
            return;
        };
        let mut data = page.data.clone();
        for item in &mut data {
            patch(item);
        }
        let next_cursor = page.next_cursor;
        self.replace_page(index, Page::new(data, next_cursor));
    }

    /// Prepends a synthesized item to page 0, leaving later pages alone.
    pub fn prepend_first(&mut self, item: Value) {
        let Some(page) = self.pages.first() else {
            return;
        };
        let mut data = Vec::with_capacity(page.data.len() + 1);
        data.push(item);
        data.extend(page.data.iter().cloned());
        let next_cursor = page.next_cursor;
        self.replace_page(0, Page::new(data, next_cursor));
    }

    /// Removes all items matching `remove` from the page at `index`.
    pub fn remove_from_page(&mut self, index: usize, mut remove: impl FnMut(&Value) -> bool) {
        let Some(page) = self.pages.get(index) else {
            return;
        };
        let data = page
            .data
            .iter()
            .filter(|item| !remove(item))
            .cloned()
            .collect();
        let next_cursor = page.next_cursor;
        self.replace_page(index, Page::new(data, next_cursor));
    }
}

/// Value stored under a query key.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// An arbitrary JSON value (single object or flat list).
    Simple(Value),
    /// An ordered sequence of cursor pages.
    Paginated(Paginated),
}

impl CacheEntry {
    pub fn as_simple(&self) -> Option<&Value> {
        match self {
            CacheEntry::Simple(value) => Some(value),
            CacheEntry::Paginated(_) => None,
        }
    }

    pub fn as_paginated(&self) -> Option<&Paginated> {
        match self {
            CacheEntry::Paginated(paginated) => Some(paginated),
            CacheEntry::Simple(_) => None,
        }
    }
}
