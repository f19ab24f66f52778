//! Caller-facing handle over the runtime store.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::selectors::{self, Counts};
use crate::types::{Filter, LoadStatus, Sort, TodoAction, TodoId, TodoItem, TodoState};
use std::sync::Arc;
use std::time::Duration;
use todo_store_runtime::{EffectHandle, Store, StoreError};
use tokio::sync::Mutex;

type Inner = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Todo list with typed commands and derived reads
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct TodoStore {
    inner: Inner,
    fetch_guard: Arc<Mutex<()>>,
}

impl TodoStore {
    /// Creates an empty store
    #[must_use]
    pub fn new(environment: TodoEnvironment) -> Self {
        Self::with_state(TodoState::new(), environment)
    }

    /// Creates a store starting from `state`
    #[must_use]
    pub fn with_state(state: TodoState, environment: TodoEnvironment) -> Self {
        Self {
            inner: Store::new(state, TodoReducer::new(), environment),
            fetch_guard: Arc::new(Mutex::new(())),
        }
    }

    async fn dispatch(&self, action: TodoAction) -> Result<EffectHandle, StoreError> {
        self.inner.send(action).await
    }

    /// Add a todo with `title`; blank titles are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn add(&self, title: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Add {
            title: title.into(),
        })
        .await
        .map(drop)
    }

    /// Flip the completion flag of `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn toggle(&self, id: impl Into<TodoId>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Toggle { id: id.into() })
            .await
            .map(drop)
    }

    /// Remove `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn delete(&self, id: impl Into<TodoId>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Delete { id: id.into() })
            .await
            .map(drop)
    }

    /// Retitle `id`; blank or unchanged titles are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn edit(
        &self,
        id: impl Into<TodoId>,
        title: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.dispatch(TodoAction::Edit {
            id: id.into(),
            title: title.into(),
        })
        .await
        .map(drop)
    }

    /// Remove every todo
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::ClearAll).await.map(drop)
    }

    /// Replace the active filter
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn set_filter(&self, filter: Filter) -> Result<(), StoreError> {
        self.dispatch(TodoAction::SetFilter(filter)).await.map(drop)
    }

    /// Replace the active sort
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn set_sort(&self, sort: Sort) -> Result<(), StoreError> {
        self.dispatch(TodoAction::SetSort(sort)).await.map(drop)
    }

    /// Start loading seed todos
    ///
    /// The returned handle resolves once the result has been merged or the
    /// failure recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn fetch_seed(&self) -> Result<EffectHandle, StoreError> {
        self.dispatch(TodoAction::FetchSeed).await
    }

    /// Start loading seed todos unless a fetch has already been started
    ///
    /// Returns `None` when the status is anything other than `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn fetch_seed_if_idle(&self) -> Result<Option<EffectHandle>, StoreError> {
        let _guard = self.fetch_guard.lock().await;
        let status = self.status().await;
        if status != LoadStatus::Idle {
            tracing::debug!(%status, "Seed fetch skipped");
            return Ok(None);
        }
        self.fetch_seed().await.map(Some)
    }

    /// Items after applying the current filter and sort
    pub async fn visible(&self) -> Vec<TodoItem> {
        self.inner.state(selectors::visible).await
    }

    /// Total and completed counts
    pub async fn counts(&self) -> Counts {
        self.inner.state(selectors::counts).await
    }

    /// Seed fetch lifecycle
    pub async fn status(&self) -> LoadStatus {
        self.inner.state(|s| s.status).await
    }

    /// Message from the last failed fetch
    pub async fn error(&self) -> Option<String> {
        self.inner.state(|s| s.error.clone()).await
    }

    /// Active filter
    pub async fn filter(&self) -> Filter {
        self.inner.state(|s| s.filter).await
    }

    /// Active sort
    pub async fn sort(&self) -> Sort {
        self.inner.state(|s| s.sort).await
    }

    /// Every item in storage order
    pub async fn items(&self) -> Vec<TodoItem> {
        self.inner.state(|s| s.items.clone()).await
    }

    /// Snapshot of the whole state
    pub async fn state(&self) -> TodoState {
        self.inner.state(Clone::clone).await
    }

    /// Effects still running, such as an in-flight fetch
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.inner.pending_effects()
    }

    /// Stop accepting commands and wait for running effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.inner.shutdown(timeout).await
    }
}
