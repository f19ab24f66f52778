//! Domain types for the todo store.
//!
//! The collection is a flat, insertion-ordered list of [`TodoItem`]s plus
//! view state (filter, sort) and the lifecycle of the one remote seed fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest magnitude an `f64` holds without losing integer precision
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Opaque, stable identifier of a todo item
///
/// Locally created items get a random token; items from the seed source use
/// the stringified remote id, so both live in the same id space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a `TodoId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the id used for a record from the seed source
    ///
    /// Integral values lose any fractional part (`1.0` becomes `"1"`), so the
    /// same record always maps to the same id.
    #[must_use]
    pub fn from_number(id: &serde_json::Number) -> Self {
        if let Some(n) = id.as_u64() {
            return Self(n.to_string());
        }
        if let Some(n) = id.as_i64() {
            return Self(n.to_string());
        }
        match id.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                #[allow(clippy::cast_possible_truncation)]
                let n = n as i64;
                Self(n.to_string())
            },
            _ => Self(id.to_string()),
        }
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is a finite number
    #[must_use]
    pub fn numeric(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Display text, never blank
    pub title: String,
    /// Whether the todo is done
    pub completed: bool,
    /// When the todo was created; never changes
    pub created_at: DateTime<Utc>,
    /// When the title or completion flag last changed
    pub updated_at: DateTime<Utc>,
}

impl TodoItem {
    /// Creates a new, not yet completed item
    #[must_use]
    pub const fn new(id: TodoId, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed: false,
            created_at,
            updated_at: created_at,
        }
    }

    /// Builds an item from a seed record, stamped with the fetch time
    ///
    /// Returns `None` for records whose title is blank.
    #[must_use]
    pub fn from_remote(record: &RemoteTodo, fetched_at: DateTime<Utc>) -> Option<Self> {
        let title = record.title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            id: record.id.clone(),
            title: title.to_string(),
            completed: record.completed,
            created_at: fetched_at,
            updated_at: fetched_at,
        })
    }

    /// Flips the completion flag
    pub fn toggle(&mut self, at: DateTime<Utc>) {
        self.completed = !self.completed;
        self.updated_at = at;
    }

    /// Replaces the title if `title` is non-blank and different
    ///
    /// Returns whether the item changed.
    pub fn retitle(&mut self, title: &str, at: DateTime<Utc>) -> bool {
        let title = title.trim();
        if title.is_empty() || title == self.title {
            return false;
        }

        self.title = title.to_string();
        self.updated_at = at;
        true
    }
}

/// A record as served by the seed source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTodo {
    /// Remote id, stringified; the source may send a number or a string
    #[serde(deserialize_with = "deserialize_remote_id")]
    pub id: TodoId,
    /// Title text
    pub title: String,
    /// Completion flag
    pub completed: bool,
}

fn deserialize_remote_id<'de, D>(deserializer: D) -> Result<TodoId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => TodoId::from_number(&n),
        RawId::Text(s) => TodoId::new(s),
    })
}

/// Returned when parsing a filter, sort, or status name fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Which items the visible list includes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Done,
}

impl Filter {
    /// Every filter, in display order
    pub const VARIANTS: [Self; 3] = [Self::All, Self::Active, Self::Done];

    /// Wire name of the filter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Active => "ACTIVE",
            Self::Done => "DONE",
        }
    }

    /// Whether an item passes this filter
    #[must_use]
    pub const fn matches(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Done => item.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOptionError::new("filter", s))
    }
}

/// How the visible list is ordered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sort {
    /// Newest `created_at` first
    #[default]
    Recent,
    /// Ascending numeric id
    Id,
}

impl Sort {
    /// Every sort, in display order
    pub const VARIANTS: [Self; 2] = [Self::Recent, Self::Id];

    /// Wire name of the sort
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "RECENT",
            Self::Id => "ID",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOptionError::new("sort", s))
    }
}

/// Lifecycle of the seed fetch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// No fetch started yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch to resolve succeeded
    Succeeded,
    /// The last fetch to resolve failed
    Failed,
}

impl LoadStatus {
    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Idle, Self::Loading, Self::Succeeded, Self::Failed]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOptionError::new("status", s))
    }
}

/// State of the todo collection
///
/// `items` is kept in storage order (newest local item first). Display order
/// is derived by the selectors from `sort`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Every item, newest local item first
    pub items: Vec<TodoItem>,
    /// Lifecycle of the seed fetch
    pub status: LoadStatus,
    /// Failure message, present only while `status` is `Failed`
    pub error: Option<String>,
    /// Active filter
    pub filter: Filter,
    /// Active sort
    pub sort: Sort,
}

impl TodoState {
    /// Creates an empty, idle collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle collection holding `items`
    #[must_use]
    pub fn with_items(items: Vec<TodoItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.completed).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|t| &t.id == id)
    }

    /// Returns a mutable todo by ID
    pub fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }
}

/// Every input to the todo reducer
///
/// User commands come from the presentation layer; the seed outcomes are
/// produced by the fetch effect and fed back by the runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Create a new todo at the front of the list
    Add {
        /// Title; ignored if blank
        title: String,
    },

    /// Flip a todo's completion flag
    Toggle {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo
    Delete {
        /// Todo to delete
        id: TodoId,
    },

    /// Change a todo's title
    Edit {
        /// Todo to edit
        id: TodoId,
        /// New title; ignored if blank or unchanged
        title: String,
    },

    /// Remove every todo
    ClearAll,

    /// Change the active filter
    SetFilter(Filter),

    /// Change the active sort
    SetSort(Sort),

    /// Start the remote seed fetch
    FetchSeed,

    // ========== Fetch outcomes ==========
    /// The seed source returned records
    SeedLoaded {
        /// Records in the order the source returned them
        records: Vec<RemoteTodo>,
    },

    /// The seed source failed
    SeedFailed {
        /// Human-readable reason
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_store_core::environment::Clock;
    use todo_store_testing::test_clock;

    #[test]
    fn todo_id_display_and_numeric() {
        let id = TodoId::from_number(&serde_json::Number::from(42u64));
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.numeric(), Some(42.0));
        assert_eq!(TodoId::from("V1StGXR8_Z5jdHi6B-myT").numeric(), None);
        assert_eq!(TodoId::from("NaN").numeric(), None);
    }

    #[test]
    fn todo_item_new_stamps_both_times() {
        let now = test_clock().now();
        let item = TodoItem::new(TodoId::from("a"), "Test todo".to_string(), now);

        assert!(!item.completed);
        assert_eq!(item.created_at, now);
        assert_eq!(item.updated_at, now);
    }

    #[test]
    fn retitle_ignores_blank_and_unchanged() {
        let created = test_clock().now();
        let later = created + chrono::Duration::seconds(5);
        let mut item = TodoItem::new(TodoId::from("a"), "Walk dog".to_string(), created);

        assert!(!item.retitle("   ", later));
        assert!(!item.retitle("  Walk dog ", later));
        assert_eq!(item.updated_at, created);

        assert!(item.retitle("  Walk cat ", later));
        assert_eq!(item.title, "Walk cat");
        assert_eq!(item.updated_at, later);
    }

    #[test]
    fn from_remote_trims_and_skips_blank() {
        let now = test_clock().now();
        let record = RemoteTodo {
            id: TodoId::from("7"),
            title: " delectus aut autem ".to_string(),
            completed: true,
        };
        let item = TodoItem::from_remote(&record, now).unwrap();
        assert_eq!(item.id, TodoId::from("7"));
        assert_eq!(item.title, "delectus aut autem");
        assert!(item.completed);
        assert_eq!(item.created_at, now);

        let blank = RemoteTodo {
            id: TodoId::from("8"),
            title: "  ".to_string(),
            completed: false,
        };
        assert!(TodoItem::from_remote(&blank, now).is_none());
    }

    #[test]
    fn remote_todo_ignores_unknown_fields() {
        let json = r#"[{"userId":1,"id":1,"title":"delectus aut autem","completed":false}]"#;
        let records: Vec<RemoteTodo> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, TodoId::from("1"));
    }

    #[test]
    fn remote_ids_accept_any_json_number_or_string() {
        let json = r#"[
            {"id": 1.0, "title": "a", "completed": false},
            {"id": -1, "title": "b", "completed": false},
            {"id": 2.5, "title": "c", "completed": false},
            {"id": "abc", "title": "d", "completed": true}
        ]"#;
        let records: Vec<RemoteTodo> = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "-1", "2.5", "abc"]);
    }

    #[test]
    fn options_parse_wire_names() {
        assert_eq!("DONE".parse::<Filter>(), Ok(Filter::Done));
        assert_eq!("active".parse::<Filter>(), Ok(Filter::Active));
        assert_eq!("ID".parse::<Sort>(), Ok(Sort::Id));
        assert_eq!("failed".parse::<LoadStatus>(), Ok(LoadStatus::Failed));

        let err = "LATEST".parse::<Sort>().unwrap_err();
        assert_eq!(err.to_string(), "unknown sort `LATEST`");
    }

    #[test]
    fn options_serialize_as_wire_names() {
        assert_eq!(serde_json::to_string(&Filter::Active).unwrap(), r#""ACTIVE""#);
        assert_eq!(serde_json::to_string(&Sort::Recent).unwrap(), r#""RECENT""#);
        assert_eq!(
            serde_json::to_string(&LoadStatus::Succeeded).unwrap(),
            r#""succeeded""#
        );
    }

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = TodoState::new();
        assert_eq!(state.count(), 0);
        assert_eq!(state.status, LoadStatus::Idle);
        assert_eq!(state.error, None);
        assert_eq!(state.filter, Filter::All);
        assert_eq!(state.sort, Sort::Recent);
    }
}
