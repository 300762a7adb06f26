//! Ordered k-way merge over any number of sealed runs.
//!
//! One cursor per input run, plus a min-heap over each cursor's current head
//! keyed by the active comparator. Construction does no I/O; the first
//! `more()`/`next()` call primes the heap by reading one record from every
//! child, which may fail per-run. Once exhausted the iterator is terminal.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use spillsort_core::error::{Error, Result};
use spillsort_core::options::SortOptions;
use spillsort_core::stream::SortedStream;

/// Current head of one input run, ordered by the shared comparator.
struct MergeHead<K, V, C> {
    data: (K, V),
    source: usize,
    cmp: Arc<C>,
}

impl<K, V, C> PartialEq for MergeHead<K, V, C>
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    fn eq(&self, other: &Self) -> bool {
        (*self.cmp)(&self.data, &other.data) == Ordering::Equal
    }
}

impl<K, V, C> Eq for MergeHead<K, V, C> where C: Fn(&(K, V), &(K, V)) -> Ordering {}

impl<K, V, C> PartialOrd for MergeHead<K, V, C>
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, V, C> Ord for MergeHead<K, V, C>
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    fn cmp(&self, other: &Self) -> Ordering {
        (*self.cmp)(&self.data, &other.data)
    }
}

/// Merges N individually sorted runs into one globally sorted stream,
/// optionally bounded to the `limit` smallest records.
pub struct MergeIterator<K, V, C> {
    sources: Vec<Box<dyn SortedStream<K, V>>>,
    heap: BinaryHeap<Reverse<MergeHead<K, V, C>>>,
    cmp: Arc<C>,
    /// Records still allowed out; `None` means unbounded.
    remaining: Option<u64>,
    primed: bool,
}

impl<K, V, C> MergeIterator<K, V, C>
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    /// Build a merge over `sources`. Performs no I/O until first use.
    pub fn new(
        sources: Vec<Box<dyn SortedStream<K, V>>>,
        opts: &SortOptions,
        cmp: Arc<C>,
    ) -> Self {
        let len = sources.len();
        Self {
            sources,
            heap: BinaryHeap::with_capacity(len),
            cmp,
            remaining: (opts.limit > 0).then_some(opts.limit),
            primed: false,
        }
    }

    /// Read the first record from every child run into the heap.
    fn prime(&mut self) -> Result<()> {
        self.primed = true;
        for idx in 0..self.sources.len() {
            if self.sources[idx].more()? {
                let data = self.sources[idx].next()?;
                self.heap.push(Reverse(MergeHead {
                    data,
                    source: idx,
                    cmp: Arc::clone(&self.cmp),
                }));
            }
        }
        Ok(())
    }
}

impl<K, V, C> SortedStream<K, V> for MergeIterator<K, V, C>
where
    C: Fn(&(K, V), &(K, V)) -> Ordering,
{
    fn more(&mut self) -> Result<bool> {
        if !self.primed {
            self.prime()?;
        }
        if self.remaining == Some(0) {
            return Ok(false);
        }
        Ok(!self.heap.is_empty())
    }

    fn next(&mut self) -> Result<(K, V)> {
        if !self.more()? {
            return Err(Error::InvalidOperation(
                "next() called past the end of the merged output".into(),
            ));
        }

        let Reverse(head) = self.heap.pop().ok_or_else(|| {
            Error::InvalidOperation("merge heap empty after more() returned true".into())
        })?;

        // Advance the cursor the head came from and re-insert its new head.
        if self.sources[head.source].more()? {
            let data = self.sources[head.source].next()?;
            self.heap.push(Reverse(MergeHead {
                data,
                source: head.source,
                cmp: Arc::clone(&self.cmp),
            }));
        }

        if let Some(rem) = self.remaining.as_mut() {
            *rem -= 1;
        }
        Ok(head.data)
    }
}
