//! Search term and sort order for a list view.
//!
//! A [`FilterStore`] only holds configuration. Views read it to decide which
//! items to show and in what order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering applied to a filtered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    /// Title, A to Z.
    #[default]
    #[serde(rename = "az")]
    TitleAsc,
    /// Title, Z to A.
    #[serde(rename = "za")]
    TitleDesc,
}

impl SortMode {
    /// Compare two titles under this mode, ignoring case.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let ordering = a.to_lowercase().cmp(&b.to_lowercase());
        match self {
            SortMode::TitleAsc => ordering,
            SortMode::TitleDesc => ordering.reverse(),
        }
    }
}

/// Filter configuration of one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub term: String,
    pub sort_mode: SortMode,
}

impl FilterState {
    /// Check whether `title` passes the term (case-insensitive substring).
    pub fn matches(&self, title: &str) -> bool {
        let term = self.term.trim();
        term.is_empty() || title.to_lowercase().contains(&term.to_lowercase())
    }

    /// Keep matching items and order them by title.
    pub fn apply<'a, T, F>(&self, items: impl IntoIterator<Item = &'a T>, title: F) -> Vec<&'a T>
    where
        T: 'a,
        F: Fn(&T) -> &str,
    {
        let mut visible: Vec<&T> = items
            .into_iter()
            .filter(|item| self.matches(title(*item)))
            .collect();
        visible.sort_by(|a, b| self.sort_mode.compare(title(*a), title(*b)));
        visible
    }
}

/// Commands accepted by a [`FilterStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetTerm(String),
    SetSortMode(SortMode),
}

/// Filter configuration holder for one list.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    /// Create a store with an empty term and the default sort mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an empty term and the given sort mode.
    pub fn with_sort_mode(sort_mode: SortMode) -> Self {
        Self {
            state: FilterState {
                term: String::new(),
                sort_mode,
            },
        }
    }

    /// Current configuration.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Apply a command. Returns `true` if the state changed.
    pub fn apply(&mut self, action: FilterAction) -> bool {
        let before = self.state.clone();
        match action {
            FilterAction::SetTerm(term) => self.state.term = term,
            FilterAction::SetSortMode(sort_mode) => self.state.sort_mode = sort_mode,
        }
        self.state != before
    }

    /// Replace the search term.
    pub fn set_term(&mut self, term: impl Into<String>) -> bool {
        self.apply(FilterAction::SetTerm(term.into()))
    }

    /// Replace the sort mode.
    pub fn set_sort_mode(&mut self, sort_mode: SortMode) -> bool {
        self.apply(FilterAction::SetSortMode(sort_mode))
    }
}
