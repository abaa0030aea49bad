//! Derived view: title search composed with creation-date sort.
//!
//! The view is always `sort(filter(all_notes, query), order)`; neither step
//! touches the underlying list.

use std::cmp::Ordering;

use crate::types::{Note, SortOrder};

/// Parameters the view is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Title filter. `None` when search is disabled.
    pub search: Option<String>,
    /// Sort order. `None` keeps server order.
    pub sort: Option<SortOrder>,
}

/// Notes whose title contains `query`, case-insensitively.
///
/// An empty query matches everything.
pub fn filter_by_title<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| note.title.to_lowercase().contains(&needle))
        .collect()
}

/// Sort by `created_at`, stable for equal timestamps.
///
/// Notes without a timestamp go last in either order.
pub fn sort_by_created(notes: &mut [&Note], order: SortOrder) {
    notes.sort_by(|a, b| compare_created(a, b, order));
}

fn compare_created(a: &Note, b: &Note, order: SortOrder) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => match order {
            SortOrder::Newest => b.cmp(&a),
            SortOrder::Oldest => a.cmp(&b),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Recompute the displayed view from the full list.
pub fn derive_view(notes: &[Note], query: &ViewQuery) -> Vec<Note> {
    let mut view = match &query.search {
        Some(q) => filter_by_title(notes, q),
        None => notes.iter().collect(),
    };
    if let Some(order) = query.sort {
        sort_by_created(&mut view, order);
    }
    view.into_iter().cloned().collect()
}
