//! Comparator helpers.
//!
//! A comparator is any `Fn(&(K, V), &(K, V)) -> Ordering` over the full
//! record pair. It must be a strict weak order that every run agrees on;
//! an inconsistent comparator is a precondition violation the engine does
//! not detect. Key-only comparators are legal and intentionally tolerate
//! reordering of equal records across runs.

use std::cmp::Ordering;

/// Compare records by key alone, ignoring values.
pub fn by_key<K: Ord, V>() -> impl Fn(&(K, V), &(K, V)) -> Ordering {
    |a, b| a.0.cmp(&b.0)
}

/// Compare by key, then by value, yielding one deterministic global order.
pub fn by_pair<K: Ord, V: Ord>() -> impl Fn(&(K, V), &(K, V)) -> Ordering {
    |a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}

/// Reverse an existing comparator (largest-first output).
pub fn reverse<K, V, C>(cmp: C) -> impl Fn(&(K, V), &(K, V)) -> Ordering
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    move |a, b| cmp(b, a)
}
