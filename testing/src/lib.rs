//! # Todo Store Testing
//!
//! Testing utilities for reducers built on `todo-store-core`.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits
//!   ([`FixedClock`], [`SteppingClock`], [`SequentialIdGenerator`])
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`resolve_effects`] to drive effect futures without a Store
//!
//! ## Example
//!
//! ```
//! use todo_store_core::environment::Clock;
//! use todo_store_testing::{test_clock, SteppingClock};
//!
//! let start = test_clock().now();
//! let clock = SteppingClock::starting_at(start);
//! assert_eq!(clock.now(), start);
//! assert!(clock.now() > start);
//! ```

use chrono::{DateTime, Duration, Utc};
use todo_store_core::effect::Effect;
use todo_store_core::environment::{Clock, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, IdGenerator, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::FixedClock;
    /// use todo_store_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Clock that advances by a fixed step on every read
    ///
    /// Useful when a test needs "later" timestamps without sleeping.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Start at `start`, advancing one second per `now()` call
        #[must_use]
        pub fn starting_at(start: DateTime<Utc>) -> Self {
            Self::with_step(start, Duration::seconds(1))
        }

        /// Start at `start`, advancing by `step` per `now()` call
        #[must_use]
        pub const fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Predictable ids: `<prefix>1`, `<prefix>2`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        counter: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Ids of the form `local-1`, `local-2`, ...
        #[must_use]
        pub fn new() -> Self {
            Self::with_prefix("local-")
        }

        /// Ids with a custom prefix; an empty prefix yields numeric ids
        #[must_use]
        pub fn with_prefix(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: AtomicU64::new(0),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{}{n}", self.prefix)
        }
    }
}

pub use mocks::{FixedClock, SequentialIdGenerator, SteppingClock, test_clock};

/// Run every effect to completion and collect the actions they produce
///
/// Futures are awaited one after another in order, so the result is
/// deterministic. This mirrors what the Store would feed back into
/// the reducer, without a Store or a spawned task.
pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(fut) = effect {
            if let Some(action) = fut.await {
                actions.push(action);
            }
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_stepping_clock_advances() {
        let start = test_clock().now();
        let clock = SteppingClock::with_step(start, Duration::milliseconds(10));
        let first = clock.now();
        let second = clock.now();
        assert_eq!(first, start);
        assert_eq!(second - first, Duration::milliseconds(10));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(), "local-1");
        assert_eq!(ids.next_id(), "local-2");

        let numeric = SequentialIdGenerator::with_prefix("");
        assert_eq!(numeric.next_id(), "1");
    }

    #[test]
    fn test_resolve_effects_in_order() {
        let effects = vec![
            Effect::future(async { Some(1) }),
            Effect::None,
            Effect::future(async { Some(2) }),
            Effect::future(async { None }),
            Effect::future(async { Some(3) }),
        ];

        let actions = tokio_test::block_on(resolve_effects(effects));
        assert_eq!(actions, vec![1, 2, 3]);
    }
}
