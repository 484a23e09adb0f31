//! Browse-table view model
//!
//! Pagination and sort state over filter-engine output. Purely derived:
//! the only stored data is the last computed row set, recomputed on
//! every filter, query or sort change. Changing the working set resets
//! the page to 0 because the old page position no longer means anything.

use crate::filter::{self, FacetSelection, SortSpec};
use crate::repository::TechniqueRepository;
use crate::types::Technique;
use std::sync::Arc;

/// Filter/sort/pagination state for the browse table.
#[derive(Debug)]
pub struct TableViewModel {
    repo: Arc<TechniqueRepository>,
    selection: FacetSelection,
    query: Option<String>,
    sort: SortSpec,
    page_index: usize,
    page_size: usize,
    rows: Vec<Arc<Technique>>,
}

impl TableViewModel {
    pub fn new(repo: Arc<TechniqueRepository>, page_size: usize) -> Self {
        let mut model = TableViewModel {
            repo,
            selection: FacetSelection::new(),
            query: None,
            sort: SortSpec::default(),
            page_index: 0,
            page_size: page_size.max(1),
            rows: Vec::new(),
        };
        model.recompute();
        model
    }

    fn recompute(&mut self) {
        self.rows = filter::apply(
            &self.repo,
            &self.selection,
            self.query.as_deref(),
            &self.sort,
        );
    }

    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn set_filter(&mut self, selection: FacetSelection) {
        self.selection = selection;
        self.page_index = 0;
        self.recompute();
    }

    pub fn set_query(&mut self, query: Option<String>) {
        self.query = query.filter(|q| !q.trim().is_empty());
        self.page_index = 0;
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.page_index = 0;
        self.recompute();
    }

    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    pub fn page(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to a page, clamped to the last one.
    pub fn set_page(&mut self, page: usize) {
        let last = self.total_pages().saturating_sub(1);
        self.page_index = page.min(last);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page_index + 1);
    }

    pub fn prev_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    /// The rows on the current page.
    pub fn visible_slice(&self) -> &[Arc<Technique>] {
        let start = self.page_index * self.page_size;
        if start >= self.rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}
