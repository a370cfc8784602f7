use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{Todo, TodoId};
use crate::error::{Result, UniverseError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn admits(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(format!("unknown filter `{other}`")),
        }
    }
}

/// Appends a todo with an id derived from `now`. When that millisecond is
/// already taken the id is bumped past the current maximum.
pub fn add<'a>(todos: &'a mut Vec<Todo>, text: &str, now: DateTime<Utc>) -> Result<&'a Todo> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UniverseError::EmptyInput);
    }
    let mut id = now.timestamp_millis();
    if todos.iter().any(|t| t.id.0 == id) {
        id = todos.iter().map(|t| t.id.0).max().unwrap_or(id) + 1;
    }
    todos.push(Todo::new(TodoId(id), text, now));
    Ok(&todos[todos.len() - 1])
}

/// Flips `completed`; `None` when the id is unknown.
pub fn toggle(todos: &mut [Todo], id: TodoId) -> Option<&Todo> {
    let todo = todos.iter_mut().find(|t| t.id == id)?;
    todo.completed = !todo.completed;
    Some(todo)
}

/// Replaces the text of `id`. Blank replacement text is ignored rather than
/// rejected; returns whether anything changed.
pub fn rename(todos: &mut [Todo], id: TodoId, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    match todos.iter_mut().find(|t| t.id == id) {
        Some(todo) => {
            todo.text = text.to_string();
            true
        }
        None => false,
    }
}

pub fn remove(todos: &mut Vec<Todo>, id: TodoId) -> Option<Todo> {
    let pos = todos.iter().position(|t| t.id == id)?;
    Some(todos.remove(pos))
}

pub fn filtered(todos: &[Todo], filter: Filter) -> impl Iterator<Item = &Todo> {
    todos.iter().filter(move |t| filter.admits(t))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl Stats {
    pub fn of(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total: todos.len(),
            completed,
            remaining: todos.len() - completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub editing: bool,
}

/// Everything the list markup is regenerated from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    pub filter: Filter,
    pub items: Vec<ItemView>,
    pub stats: Stats,
}

impl ListView {
    pub fn build(todos: &[Todo], filter: Filter, editing: Option<TodoId>) -> Self {
        let items = filtered(todos, filter)
            .map(|t| ItemView {
                id: t.id,
                text: t.text.clone(),
                completed: t.completed,
                editing: editing == Some(t.id),
            })
            .collect();
        Self {
            filter,
            items,
            stats: Stats::of(todos),
        }
    }

    /// The empty-state indicator replaces the list when nothing passes the filter.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
