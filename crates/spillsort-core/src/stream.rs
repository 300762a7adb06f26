//! The pull-based iterator contract over sorted output.
//!
//! All run sources (in-memory, file-backed, merged) implement this one
//! interface so the merge engine can treat children uniformly. Implementations
//! are single-pass and forward-only: once exhausted they cannot be rewound.

use crate::error::Result;

/// A sorted, forward-only stream of (Key, Value) records.
///
/// `more` may perform I/O to buffer the next record and can therefore fail;
/// a successful `more() == true` guarantees the following `next` has a record
/// to hand back (barring new I/O faults on lazier implementations).
pub trait SortedStream<K, V> {
    /// Is another record available without consuming it?
    fn more(&mut self) -> Result<bool>;

    /// Return the next record, advancing the stream. Calling this after the
    /// stream is exhausted is an `InvalidOperation`.
    fn next(&mut self) -> Result<(K, V)>;
}

/// Drain helper used by tests and simple consumers.
pub fn collect<K, V>(stream: &mut dyn SortedStream<K, V>) -> Result<Vec<(K, V)>> {
    let mut out = Vec::new();
    while stream.more()? {
        out.push(stream.next()?);
    }
    Ok(out)
}
