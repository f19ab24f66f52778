//! Derived reads over [`TodoState`].
//!
//! Both selectors are pure and recomputed on every call.

use crate::types::{Filter, Sort, TodoItem, TodoState};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Totals shown alongside the list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Every item
    pub total: usize,
    /// Completed items
    pub done: usize,
}

/// The filtered and sorted list presented to the caller
#[must_use]
pub fn visible(state: &TodoState) -> Vec<TodoItem> {
    visible_with(state, state.filter, state.sort)
}

/// [`visible`] with an explicit filter and sort instead of the stored ones
#[must_use]
pub fn visible_with(state: &TodoState, filter: Filter, sort: Sort) -> Vec<TodoItem> {
    let mut list: Vec<TodoItem> = state
        .items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();

    match sort {
        Sort::Recent => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Sort::Id => list.sort_by(compare_ids),
    }
    list
}

/// Ascending numeric id; non-numeric ids after all numeric ones
///
/// Non-numeric ids compare equal to each other, so the stable sort keeps their
/// storage order.
fn compare_ids(a: &TodoItem, b: &TodoItem) -> Ordering {
    match (a.id.numeric(), b.id.numeric()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Total and completed counts
#[must_use]
pub fn counts(state: &TodoState) -> Counts {
    Counts {
        total: state.count(),
        done: state.completed_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;
    use chrono::Duration;
    use todo_store_core::environment::Clock;
    use todo_store_testing::test_clock;

    fn item(id: &str, completed: bool, minutes: i64) -> TodoItem {
        let mut item = TodoItem::new(
            TodoId::from(id),
            format!("todo {id}"),
            test_clock().now() + Duration::minutes(minutes),
        );
        item.completed = completed;
        item
    }

    fn ids(list: &[TodoItem]) -> Vec<&str> {
        list.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn done_sorted_by_id() {
        let mut state = TodoState::with_items(vec![
            item("3", true, 0),
            item("1", true, 1),
            item("2", false, 2),
        ]);
        state.filter = Filter::Done;
        state.sort = Sort::Id;

        assert_eq!(ids(&visible(&state)), vec!["1", "3"]);
    }

    #[test]
    fn ids_compare_numerically_not_lexically() {
        let mut state =
            TodoState::with_items(vec![item("10", false, 0), item("9", false, 0), item("100", false, 0)]);
        state.sort = Sort::Id;

        assert_eq!(ids(&visible(&state)), vec!["9", "10", "100"]);
    }

    #[test]
    fn recent_puts_newest_first() {
        let state = TodoState::with_items(vec![
            item("a", false, 5),
            item("b", false, 10),
            item("c", false, 1),
        ]);

        assert_eq!(ids(&visible(&state)), vec!["b", "a", "c"]);
    }

    #[test]
    fn recent_keeps_storage_order_on_ties() {
        let state = TodoState::with_items(vec![item("2", false, 0), item("1", false, 0)]);
        assert_eq!(ids(&visible(&state)), vec!["2", "1"]);
    }

    #[test]
    fn active_filter_keeps_open_items() {
        let mut state = TodoState::with_items(vec![item("1", true, 0), item("2", false, 1)]);
        state.filter = Filter::Active;

        assert_eq!(ids(&visible(&state)), vec!["2"]);
    }

    #[test]
    fn non_numeric_ids_follow_numeric_ones_in_storage_order() {
        let mut state = TodoState::with_items(vec![
            item("xYz_token", false, 0),
            item("2", false, 0),
            item("abc-token", false, 0),
            item("1", false, 0),
        ]);
        state.sort = Sort::Id;

        let first = visible(&state);
        assert_eq!(ids(&first), vec!["1", "2", "xYz_token", "abc-token"]);
        assert_eq!(visible(&state), first);
    }

    #[test]
    fn counts_total_and_done() {
        let state = TodoState::with_items(vec![
            item("1", true, 0),
            item("2", false, 0),
            item("3", true, 0),
        ]);

        assert_eq!(counts(&state), Counts { total: 3, done: 2 });
        assert_eq!(visible_with(&state, Filter::Done, Sort::Recent).len(), 2);
    }

    #[test]
    fn empty_state_has_zero_counts() {
        assert_eq!(counts(&TodoState::new()), Counts::default());
        assert!(visible(&TodoState::new()).is_empty());
    }
}
