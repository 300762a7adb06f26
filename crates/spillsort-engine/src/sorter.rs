//! The sorter facade: accumulation, budget enforcement, spilling, and the
//! final merged iterator.

use std::cmp::Ordering;
use std::sync::Arc;

use spillsort_core::error::{Error, Result};
use spillsort_core::options::SortOptions;
use spillsort_core::record::Sortable;
use spillsort_core::stream::SortedStream;
use spillsort_io::{Codec, RunReader, RunWriter, ScratchDir};

use crate::memory::PeakTracker;
use crate::merge::MergeIterator;
use crate::run::InMemoryRun;

/// Accepts an unbounded stream of (Key, Value) records and produces one
/// globally sorted output stream, spilling sorted runs to scratch files when
/// the in-memory estimate exceeds the configured budget.
///
/// Single-threaded: `add` and `done` must be invoked sequentially by one
/// logical producer. Dropping the sorter (or the returned iterator) releases
/// every scratch file it still owns.
pub struct Sorter<K: Sortable, V: Sortable, C> {
    opts: SortOptions,
    cmp: Arc<C>,
    settings: (K::Settings, V::Settings),
    scratch: Arc<ScratchDir>,
    codec: Codec,
    buffer: Vec<(K, V)>,
    mem_used: usize,
    peak: PeakTracker,
    spilled: Vec<RunReader<K, V>>,
    spill_count: usize,
    done_called: bool,
    failed: bool,
}

impl<K, V, C> Sorter<K, V, C>
where
    K: Sortable + 'static,
    V: Sortable + 'static,
    K::Settings: 'static,
    V::Settings: 'static,
    C: Fn(&(K, V), &(K, V)) -> Ordering + 'static,
{
    /// Create an empty sorter. Rejects invalid options immediately.
    pub fn new(
        opts: SortOptions,
        cmp: C,
        settings: (K::Settings, V::Settings),
        scratch: Arc<ScratchDir>,
    ) -> Result<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            cmp: Arc::new(cmp),
            settings,
            scratch,
            codec: Codec::None,
            buffer: Vec::new(),
            mem_used: 0,
            peak: PeakTracker::new(),
            spilled: Vec::new(),
            spill_count: 0,
            done_called: false,
            failed: false,
        })
    }

    /// Compression codec for spilled runs (default: none).
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Append one record. May seal the in-memory buffer into a file-backed
    /// run when the memory estimate exceeds the budget; with spilling
    /// disallowed that overflow is a hard `MemoryLimitExceeded` failure.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if self.done_called {
            return Err(Error::InvalidOperation("add() called after done()".into()));
        }
        if self.failed {
            return Err(Error::InvalidOperation(
                "sorter is unusable after a previous failure".into(),
            ));
        }

        // Deep-copy records that may reference transient external buffers.
        let key = key.into_owned();
        let value = value.into_owned();

        self.mem_used += key.mem_usage() + value.mem_usage();
        self.buffer.push((key, value));
        self.peak.record_used(self.mem_used);

        if self.mem_used > self.opts.max_memory_usage_bytes {
            if !self.opts.ext_sort_allowed {
                self.failed = true;
                return Err(Error::MemoryLimitExceeded {
                    used: self.mem_used,
                    budget: self.opts.max_memory_usage_bytes,
                });
            }
            if let Err(e) = self.spill() {
                // A partially spilled run must never reach the merge step.
                self.failed = true;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Seal the output: sorts any residual buffer and returns one stream
    /// merging it with every spilled run. Further `add` calls (and a second
    /// `done`) are programming errors.
    pub fn done(&mut self) -> Result<Box<dyn SortedStream<K, V>>> {
        if self.done_called {
            return Err(Error::InvalidOperation("done() called twice".into()));
        }
        if self.failed {
            return Err(Error::InvalidOperation(
                "sorter is unusable after a previous failure".into(),
            ));
        }
        self.done_called = true;

        self.sort_buffer();
        let residual = std::mem::take(&mut self.buffer);
        self.mem_used = 0;

        if self.spilled.is_empty() {
            return Ok(Box::new(InMemoryRun::new(residual)));
        }

        let mut sources: Vec<Box<dyn SortedStream<K, V>>> = Vec::new();
        if !residual.is_empty() {
            sources.push(Box::new(InMemoryRun::new(residual)));
        }
        // Deletion ownership of every run file moves into the merge.
        for reader in self.spilled.drain(..) {
            sources.push(Box::new(reader));
        }

        tracing::debug!(runs = sources.len(), "merging sealed runs");
        Ok(Box::new(MergeIterator::new(
            sources,
            &self.opts,
            Arc::clone(&self.cmp),
        )))
    }

    /// Number of runs spilled to disk so far. Observability only.
    pub fn spilled_runs(&self) -> usize {
        self.spill_count
    }

    /// Current estimated memory held by the unspilled buffer.
    pub fn mem_used(&self) -> usize {
        self.mem_used
    }

    /// High-water mark of the memory estimate over this sorter's lifetime.
    pub fn peak_mem_used(&self) -> usize {
        self.peak.peak()
    }

    /// Sort the buffer in place; with a limit configured, keep only the
    /// smallest `limit` records (the global top-N is always contained in the
    /// union of per-run top-Ns).
    fn sort_buffer(&mut self) {
        let cmp = Arc::clone(&self.cmp);
        self.buffer.sort_unstable_by(|a, b| (*cmp)(a, b));
        if self.opts.limit > 0 {
            let keep = usize::try_from(self.opts.limit).unwrap_or(usize::MAX);
            if self.buffer.len() > keep {
                self.buffer.truncate(keep);
            }
        }
    }

    /// Sort the buffer and seal it as a file-backed run, then reset the
    /// accumulator and its memory counter.
    fn spill(&mut self) -> Result<()> {
        self.sort_buffer();

        let mut writer = RunWriter::create(&self.scratch, self.codec, self.settings.clone())?;
        for (key, value) in &self.buffer {
            writer.add_already_sorted(key, value)?;
        }
        let reader = writer.done()?;

        self.spill_count += 1;
        tracing::debug!(
            run = self.spill_count,
            records = self.buffer.len(),
            bytes = self.mem_used,
            "spilled in-memory buffer"
        );

        self.spilled.push(reader);
        self.buffer.clear();
        self.mem_used = 0;
        Ok(())
    }
}
