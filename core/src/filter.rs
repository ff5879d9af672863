//! Search and status filtering over the todo list.
//!
//! # Design
//! `FilterState` is an immutable value. `with_search` and `with_status`
//! return a new state instead of mutating fields in place, and everything
//! derived from it (visible items, removability, description) is a pure
//! function of the state.

use serde::{Deserialize, Serialize};

use crate::todo::TodoItem;

/// The status tab selected in the list header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    /// Unknown keys select every item.
    pub fn from_key(key: &str) -> Self {
        match key {
            "active" => StatusFilter::Active,
            "completed" => StatusFilter::Completed,
            _ => StatusFilter::All,
        }
    }

    fn matches(self, item: &TodoItem) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !item.completed,
            StatusFilter::Completed => item.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// Which description applies to the current filter combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKey {
    ActiveItems,
    ActiveItemsContaining,
    CompletedItems,
    CompletedItemsContaining,
    ItemsContaining,
}

impl DescriptionKey {
    pub fn render(self, query: &str) -> String {
        match self {
            DescriptionKey::ActiveItems => "active items".to_string(),
            DescriptionKey::ActiveItemsContaining => format!("active items containing {query}"),
            DescriptionKey::CompletedItems => "completed items".to_string(),
            DescriptionKey::CompletedItemsContaining => format!("completed items containing {query}"),
            DescriptionKey::ItemsContaining => format!("items containing {query}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search_query: Option<String>,
    status: StatusFilter,
    case: CaseSensitivity,
}

impl FilterState {
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            ..Self::default()
        }
    }

    /// Replace the search predicate. An empty query clears it.
    pub fn with_search(self, query: Option<&str>) -> Self {
        let search_query = query.filter(|q| !q.is_empty()).map(str::to_string);
        Self { search_query, ..self }
    }

    pub fn with_status(self, status: StatusFilter) -> Self {
        Self { status, ..self }
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Bulk removal is disallowed while a search is active.
    pub fn items_removable(&self) -> bool {
        self.search_query.is_none()
    }

    pub fn matches(&self, item: &TodoItem) -> bool {
        self.matches_search(item) && self.status.matches(item)
    }

    pub fn apply<'a>(&self, items: &'a [TodoItem]) -> Vec<&'a TodoItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Positions of the visible items in `items`.
    pub fn positions(&self, items: &[TodoItem]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.matches(item))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn description_key(&self) -> Option<DescriptionKey> {
        let searching = self.search_query.is_some();
        match (self.status, searching) {
            (StatusFilter::Active, true) => Some(DescriptionKey::ActiveItemsContaining),
            (StatusFilter::Active, false) => Some(DescriptionKey::ActiveItems),
            (StatusFilter::Completed, true) => Some(DescriptionKey::CompletedItemsContaining),
            (StatusFilter::Completed, false) => Some(DescriptionKey::CompletedItems),
            (StatusFilter::All, true) => Some(DescriptionKey::ItemsContaining),
            (StatusFilter::All, false) => None,
        }
    }

    pub fn description(&self) -> Option<String> {
        self.description_key()
            .map(|key| key.render(self.search_query().unwrap_or_default()))
    }

    fn matches_search(&self, item: &TodoItem) -> bool {
        let Some(query) = self.search_query.as_deref() else {
            return true;
        };
        match self.case {
            CaseSensitivity::Sensitive => item.title.contains(query),
            CaseSensitivity::Insensitive => item.title.to_lowercase().contains(&query.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<TodoItem> {
        vec![
            TodoItem {
                title: "buy milk".to_string(),
                completed: false,
            },
            TodoItem {
                title: "buy bread".to_string(),
                completed: true,
            },
            TodoItem {
                title: "clean".to_string(),
                completed: false,
            },
        ]
    }

    #[test]
    fn search_and_status_combine_with_and() {
        let items = items();
        let filter = FilterState::default()
            .with_status(StatusFilter::Active)
            .with_search(Some("buy"));
        let visible = filter.apply(&items);
        assert_eq!(visible, vec![&items[0]]);
        assert_eq!(filter.description().as_deref(), Some("active items containing buy"));
    }

    #[test]
    fn no_filter_shows_everything_without_description() {
        let items = items();
        let filter = FilterState::default();
        assert_eq!(filter.apply(&items).len(), 3);
        assert_eq!(filter.description(), None);
        assert!(filter.items_removable());
    }

    #[test]
    fn new_search_replaces_previous_one() {
        let items = items();
        let filter = FilterState::default()
            .with_search(Some("milk"))
            .with_search(Some("clean"));
        assert_eq!(filter.positions(&items), vec![2]);
    }

    #[test]
    fn completed_tab_selects_completed_items() {
        let items = items();
        let filter = FilterState::default().with_status(StatusFilter::Completed);
        assert_eq!(filter.positions(&items), vec![1]);
        assert_eq!(filter.description().as_deref(), Some("completed items"));
    }

    #[test]
    fn unknown_tab_key_means_all() {
        assert_eq!(StatusFilter::from_key("archived"), StatusFilter::All);
        assert_eq!(StatusFilter::from_key("active"), StatusFilter::Active);
    }

    #[test]
    fn search_toggles_removability() {
        let filter = FilterState::default().with_search(Some("buy"));
        assert!(!filter.items_removable());
        let filter = filter.with_search(Some(""));
        assert!(filter.items_removable());
        let filter = filter.with_search(Some("x")).with_search(None);
        assert!(filter.items_removable());
    }

    #[test]
    fn description_table() {
        let cases = [
            (StatusFilter::Active, Some("q"), Some("active items containing q")),
            (StatusFilter::Active, None, Some("active items")),
            (StatusFilter::Completed, Some("q"), Some("completed items containing q")),
            (StatusFilter::Completed, None, Some("completed items")),
            (StatusFilter::All, Some("q"), Some("items containing q")),
            (StatusFilter::All, None, None),
        ];
        for (status, query, expected) in cases {
            let filter = FilterState::default().with_status(status).with_search(query);
            assert_eq!(filter.description().as_deref(), expected, "{status:?} {query:?}");
        }
    }

    #[test]
    fn description_is_stable_across_calls() {
        let filter = FilterState::default()
            .with_status(StatusFilter::Completed)
            .with_search(Some("buy"));
        assert_eq!(filter.description(), filter.description());
        assert_eq!(filter.description_key(), filter.description_key());
    }

    #[test]
    fn case_sensitivity_is_configurable() {
        let items = items();
        let sensitive = FilterState::new(CaseSensitivity::Sensitive).with_search(Some("BUY"));
        assert!(sensitive.apply(&items).is_empty());

        let insensitive = FilterState::new(CaseSensitivity::Insensitive).with_search(Some("BUY"));
        assert_eq!(insensitive.positions(&items), vec![0, 1]);
    }
}
