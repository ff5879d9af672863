//! In-memory todo list.
//!
//! # Design
//! The list is held behind an `Arc<Vec<TodoItem>>`. Every mutation builds a
//! fresh vector and swaps it in, so a snapshot handed out earlier never sees
//! a later change. Items have no id; their position is their identity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// Shape of the JSON document a store can be seeded from.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    #[serde(default)]
    todos: Vec<TodoItem>,
    #[serde(default)]
    new_todo: String,
}

#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    todos: Arc<Vec<TodoItem>>,
    new_todo: String,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<TodoItem>) -> Self {
        Self {
            todos: Arc::new(todos),
            new_todo: String::new(),
        }
    }

    /// Seed a store from `{"todos": [...], "newTodo": "..."}`.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let doc: TodoDocument =
            serde_json::from_str(json).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(Self {
            todos: Arc::new(doc.todos),
            new_todo: doc.new_todo,
        })
    }

    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn snapshot(&self) -> Arc<Vec<TodoItem>> {
        Arc::clone(&self.todos)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn new_todo(&self) -> &str {
        &self.new_todo
    }

    pub fn set_new_todo(&mut self, text: impl Into<String>) {
        self.new_todo = text.into();
    }

    /// Append the pending entry as an open item and clear the entry field.
    /// Empty titles are accepted.
    pub fn add_todo(&mut self) {
        let title = std::mem::take(&mut self.new_todo);
        let mut todos = self.todos.as_ref().clone();
        todos.push(TodoItem::new(title));
        self.todos = Arc::new(todos);
    }

    /// Drop every completed item, keeping the order of the rest.
    pub fn clear_completed(&mut self) {
        let remaining: Vec<TodoItem> = self
            .todos
            .iter()
            .filter(|todo| !todo.completed)
            .cloned()
            .collect();
        self.todos = Arc::new(remaining);
    }

    /// Returns false (and changes nothing) when `index` is out of range.
    pub fn set_completed(&mut self, index: usize, completed: bool) -> bool {
        if index >= self.todos.len() {
            return false;
        }
        let mut todos = self.todos.as_ref().clone();
        todos[index].completed = completed;
        self.todos = Arc::new(todos);
        true
    }

    /// Number of items not yet completed. Computed on every call.
    pub fn items_left_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, completed: bool) -> TodoItem {
        TodoItem {
            title: title.to_string(),
            completed,
        }
    }

    fn add(store: &mut TodoStore, title: &str) {
        store.set_new_todo(title);
        store.add_todo();
    }

    #[test]
    fn add_appends_open_items_in_order() {
        let mut store = TodoStore::new();
        for title in ["a", "b", "c"] {
            add(&mut store, title);
        }
        assert_eq!(store.todos(), &[item("a", false), item("b", false), item("c", false)]);
    }

    #[test]
    fn add_clears_pending_entry() {
        let mut store = TodoStore::new();
        store.set_new_todo("walk dog");
        store.add_todo();
        assert_eq!(store.new_todo(), "");
        assert_eq!(store.todos()[0].title, "walk dog");
    }

    #[test]
    fn add_accepts_empty_title() {
        let mut store = TodoStore::new();
        store.add_todo();
        assert_eq!(store.todos(), &[item("", false)]);
    }

    #[test]
    fn clear_completed_preserves_order() {
        let mut store = TodoStore::with_todos(vec![
            item("a", false),
            item("b", true),
            item("c", true),
            item("d", false),
        ]);
        store.clear_completed();
        assert_eq!(store.todos(), &[item("a", false), item("d", false)]);
    }

    #[test]
    fn items_left_counts_open_items() {
        let store = TodoStore::with_todos(vec![item("a", false), item("b", true)]);
        assert_eq!(store.items_left_count(), 1);
    }

    #[test]
    fn snapshots_do_not_observe_later_mutations() {
        let mut store = TodoStore::with_todos(vec![item("a", true), item("b", false)]);
        let before = store.snapshot();

        store.clear_completed();
        add(&mut store, "c");
        store.set_completed(0, true);

        assert_eq!(before.as_slice(), &[item("a", true), item("b", false)]);
        assert_eq!(store.todos(), &[item("b", true), item("c", false)]);
    }

    #[test]
    fn set_completed_out_of_range_is_a_no_op() {
        let mut store = TodoStore::with_todos(vec![item("a", false)]);
        assert!(!store.set_completed(3, true));
        assert_eq!(store.items_left_count(), 1);
    }

    #[test]
    fn from_json_seeds_list_and_entry() {
        let store = TodoStore::from_json(
            r#"{"newTodo":"draft","todos":[{"title":"Start this app","completed":true},{"title":"Learn Rust"}]}"#,
        )
        .unwrap();
        assert_eq!(store.new_todo(), "draft");
        assert_eq!(store.todos(), &[item("Start this app", true), item("Learn Rust", false)]);
    }

    #[test]
    fn from_json_rejects_malformed_document() {
        let err = TodoStore::from_json("[1,2]").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
