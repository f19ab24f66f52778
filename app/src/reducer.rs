//! Reducer logic for the todo collection.
//!
//! Every command either applies a complete state transition or is ignored.
//! Only `FetchSeed` returns an effect; its outcome comes back as
//! `SeedLoaded` or `SeedFailed`.

use crate::source::SeedSource;
use crate::types::{LoadStatus, RemoteTodo, TodoAction, TodoId, TodoItem, TodoState};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use todo_store_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec,
};

/// Message recorded when a fetch fails without a usable reason
pub const FETCH_FAILED_FALLBACK: &str = "Failed to fetch todos";

/// Attempts at drawing an unused id before an add is dropped
const MAX_ID_ATTEMPTS: usize = 8;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of ids for locally created todos
    pub ids: Arc<dyn IdGenerator>,
    /// Where `FetchSeed` reads from
    pub seed: Arc<dyn SeedSource>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        seed: Arc<dyn SeedSource>,
    ) -> Self {
        Self { clock, ids, seed }
    }
}

/// Reducer for the todo collection
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add(state: &mut TodoState, title: &str, env: &TodoEnvironment) {
        let title = title.trim();
        if title.is_empty() {
            tracing::debug!("Ignoring add with blank title");
            return;
        }

        let Some(id) = Self::fresh_id(state, env) else {
            tracing::warn!("Id generator kept returning ids already in use; add dropped");
            return;
        };

        tracing::debug!(%id, "Adding todo");
        let item = TodoItem::new(id, title.to_string(), env.clock.now());
        state.items.insert(0, item);
    }

    fn fresh_id(state: &TodoState, env: &TodoEnvironment) -> Option<TodoId> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| TodoId::new(env.ids.next_id()))
            .find(|id| !state.exists(id))
    }

    fn toggle(state: &mut TodoState, id: &TodoId, env: &TodoEnvironment) {
        match state.get_mut(id) {
            Some(item) => {
                item.toggle(env.clock.now());
                tracing::debug!(%id, completed = item.completed, "Toggled todo");
            },
            None => tracing::debug!(%id, "Ignoring toggle of unknown todo"),
        }
    }

    fn delete(state: &mut TodoState, id: &TodoId) {
        let before = state.items.len();
        state.items.retain(|item| &item.id != id);
        if state.items.len() == before {
            tracing::debug!(%id, "Ignoring delete of unknown todo");
        } else {
            tracing::debug!(%id, "Deleted todo");
        }
    }

    fn edit(state: &mut TodoState, id: &TodoId, title: &str, env: &TodoEnvironment) {
        let Some(item) = state.get_mut(id) else {
            tracing::debug!(%id, "Ignoring edit of unknown todo");
            return;
        };

        if item.retitle(title, env.clock.now()) {
            tracing::debug!(%id, "Edited todo");
        } else {
            tracing::debug!(%id, "Ignoring blank or unchanged edit");
        }
    }

    fn start_fetch(state: &mut TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        if state.status == LoadStatus::Loading {
            tracing::warn!("Seed fetch started while another is in flight");
        }
        tracing::info!("Fetching seed todos");

        state.status = LoadStatus::Loading;
        state.error = None;

        let seed = Arc::clone(&env.seed);
        smallvec![Effect::future(async move {
            Some(match seed.fetch().await {
                Ok(records) => TodoAction::SeedLoaded { records },
                Err(error) => TodoAction::SeedFailed {
                    error: error.to_string(),
                },
            })
        })]
    }

    fn seed_loaded(state: &mut TodoState, records: &[RemoteTodo], env: &TodoEnvironment) {
        let added = merge_remote(&mut state.items, records, env.clock.now());
        state.status = LoadStatus::Succeeded;
        state.error = None;
        tracing::info!(
            received = records.len(),
            added,
            total = state.items.len(),
            "Seed todos merged"
        );
    }

    fn seed_failed(state: &mut TodoState, error: String) {
        let error = if error.trim().is_empty() {
            FETCH_FAILED_FALLBACK.to_string()
        } else {
            error
        };
        tracing::warn!(%error, "Seed fetch failed");
        state.status = LoadStatus::Failed;
        state.error = Some(error);
    }
}

/// Append remote records whose ids are not yet present
///
/// Records are stamped with `fetched_at` for both timestamps and appended in
/// source order after the existing items. Existing items are never touched,
/// repeated ids within `records` keep their first occurrence, and records
/// with blank titles are skipped. Returns how many items were appended.
pub fn merge_remote(
    items: &mut Vec<TodoItem>,
    records: &[RemoteTodo],
    fetched_at: DateTime<Utc>,
) -> usize {
    let mut seen: HashSet<TodoId> = items.iter().map(|item| item.id.clone()).collect();
    let before = items.len();

    for record in records {
        let Some(item) = TodoItem::from_remote(record, fetched_at) else {
            tracing::debug!(id = %record.id, "Skipping seed record with blank title");
            continue;
        };
        if seen.insert(item.id.clone()) {
            items.push(item);
        }
    }

    items.len() - before
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::Add { title } => Self::add(state, &title, env),
            TodoAction::Toggle { id } => Self::toggle(state, &id, env),
            TodoAction::Delete { id } => Self::delete(state, &id),
            TodoAction::Edit { id, title } => Self::edit(state, &id, &title, env),
            TodoAction::ClearAll => {
                tracing::debug!(removed = state.items.len(), "Clearing all todos");
                state.items.clear();
            },
            TodoAction::SetFilter(filter) => state.filter = filter,
            TodoAction::SetSort(sort) => state.sort = sort,
            TodoAction::FetchSeed => return Self::start_fetch(state, env),

            // ========== Fetch outcomes ==========
            TodoAction::SeedLoaded { records } => Self::seed_loaded(state, &records, env),
            TodoAction::SeedFailed { error } => Self::seed_failed(state, error),
        }

        SmallVec::new()
    }
}
