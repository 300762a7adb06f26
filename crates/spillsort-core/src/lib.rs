#![forbid(unsafe_code)]
//! spillsort-core: Record contract, sort options, and the iterator interface.
//!
//! This crate holds only traits and plain types so downstream crates can
//! depend on the API without pulling in file or merge machinery. The run
//! file format and readers/writers live in `spillsort-io`; the sorter facade
//! and k-way merge live in `spillsort-engine`.

pub mod compare;
pub mod error;
pub mod options;
pub mod record;
pub mod stream;

pub mod prelude;

pub use error::{Error, Result};
pub use options::SortOptions;
pub use record::Sortable;
pub use stream::SortedStream;
