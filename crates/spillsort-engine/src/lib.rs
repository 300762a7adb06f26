#![forbid(unsafe_code)]
//! spillsort-engine: the sorter facade and k-way merge.
//!
//! Callers feed records through [`Sorter::add`]; the facade buffers them,
//! spills sorted runs to scratch files when the memory budget is exceeded,
//! and on [`Sorter::done`] hands back a single [`SortedStream`] merging every
//! run. The facade is single-threaded from the caller's perspective and
//! performs no internal synchronization.
//!
//! [`SortedStream`]: spillsort_core::stream::SortedStream

pub mod memory;
pub mod merge;
pub mod run;
pub mod sorter;

pub use merge::MergeIterator;
pub use run::InMemoryRun;
pub use sorter::Sorter;
