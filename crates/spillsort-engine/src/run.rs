//! An already-sorted in-memory sequence behind the run iterator contract.
//!
//! Exists purely so the merge engine can treat all run sources uniformly;
//! no disk ownership is involved.

use spillsort_core::error::{Error, Result};
use spillsort_core::stream::SortedStream;

pub struct InMemoryRun<K, V> {
    records: std::vec::IntoIter<(K, V)>,
}

impl<K, V> InMemoryRun<K, V> {
    /// Wrap a sequence that is already sorted under the active comparator.
    pub fn new(records: Vec<(K, V)>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl<K, V> SortedStream<K, V> for InMemoryRun<K, V> {
    fn more(&mut self) -> Result<bool> {
        Ok(!self.records.as_slice().is_empty())
    }

    fn next(&mut self) -> Result<(K, V)> {
        self.records.next().ok_or_else(|| {
            Error::InvalidOperation("next() called past the end of an in-memory run".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order() {
        let mut run = InMemoryRun::new(vec![(1u32, 10u32), (2, 20)]);
        assert!(run.more().unwrap());
        assert_eq!(run.next().unwrap(), (1, 10));
        assert_eq!(run.next().unwrap(), (2, 20));
        assert!(!run.more().unwrap());
        assert!(run.next().is_err());
    }
}
