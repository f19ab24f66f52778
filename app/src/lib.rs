//! To-do list state container.
//!
//! Holds a list of todo items with a view filter and sort, and can merge an
//! initial set of todos fetched from a remote source. Items created locally
//! always win over fetched records that share their id.
//!
//! - Commands (add, toggle, edit, delete, clear) are reduced atomically
//! - Derived reads ([`visible`], [`counts`]) are pure functions of the state
//! - The seed fetch runs as an effect and reports back through the store
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_store::{Filter, HttpSeedSource, TodoEnvironment, TodoStore};
//! use todo_store_core::environment::{SystemClock, UuidGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(UuidGenerator),
//!     Arc::new(HttpSeedSource::default()),
//! );
//! let store = TodoStore::new(env);
//!
//! store.add("Buy milk").await?;
//! if let Some(mut fetch) = store.fetch_seed_if_idle().await? {
//!     fetch.wait().await;
//! }
//!
//! store.set_filter(Filter::Active).await?;
//! for todo in store.visible().await {
//!     println!("{} {}", todo.id, todo.title);
//! }
//! let counts = store.counts().await;
//! println!("{}/{} done", counts.done, counts.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod selectors;
pub mod source;
pub mod store;
pub mod types;

pub use config::{Config, ConfigError};
pub use reducer::{TodoEnvironment, TodoReducer, merge_remote};
pub use selectors::{Counts, counts, visible};
pub use source::{HttpSeedSource, SeedError, SeedGate, SeedSource, StaticSeedSource};
pub use store::TodoStore;
pub use types::{
    Filter, LoadStatus, ParseOptionError, RemoteTodo, Sort, TodoAction, TodoId, TodoItem,
    TodoState,
};
