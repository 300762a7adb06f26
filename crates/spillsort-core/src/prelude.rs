//! Convenient re-exports for downstream crates.

pub use crate::error::{Error, Result};
pub use crate::options::SortOptions;
pub use crate::record::Sortable;
pub use crate::stream::SortedStream;
