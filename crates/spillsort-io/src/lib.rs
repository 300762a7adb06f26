#![forbid(unsafe_code)]
//! spillsort-io: Scratch files and the framed on-disk run format.
//!
//! A spilled run is one sequential file: a small self-describing header,
//! length-prefixed (key, value) frames in final sorted order, and a footer
//! carrying a blake3 checksum of every frame byte. Files live in a shared
//! scratch directory under globally unique names and are deleted exactly
//! once, when the last `Arc<ScratchFile>` holder drops.

pub mod codec;
pub mod frame;
pub mod reader;
pub mod scratch;
pub mod writer;

pub use codec::Codec;
pub use reader::RunReader;
pub use scratch::{ScratchDir, ScratchFile};
pub use writer::RunWriter;
