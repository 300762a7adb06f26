//! Buffered, forward-only reader over one spilled run.
//!
//! Reads are sequential — no seeking. The reader re-hashes every frame it
//! consumes and verifies the footer checksum when it reaches the sentinel,
//! so corrupt or truncated runs always surface as `Deserialization` errors
//! rather than silently short output.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use spillsort_core::error::{Error, Result};
use spillsort_core::record::Sortable;
use spillsort_core::stream::SortedStream;

use crate::codec::FrameSource;
use crate::frame::{read_exact_frame, RunHeader, CHECKSUM_LEN, HEADER_LEN, SENTINEL};
use crate::scratch::ScratchFile;

/// Sanity cap on a single serialized key or value. Anything larger is taken
/// as corruption rather than a real record.
const MAX_FRAME_PART: u32 = 256 * 1024 * 1024;

/// Buffer size for sequential run reads.
const READ_BUF_SIZE: usize = 64 * 1024;

pub struct RunReader<K: Sortable, V: Sortable> {
    source: FrameSource,
    file: Arc<ScratchFile>,
    settings: (K::Settings, V::Settings),
    hasher: blake3::Hasher,
    peeked: Option<(K, V)>,
    exhausted: bool,
}

impl<K: Sortable, V: Sortable> RunReader<K, V> {
    /// Open a run file, validating its header. Shares deletion ownership of
    /// the backing file; the file is unlinked when the last owner drops.
    pub fn open(file: Arc<ScratchFile>, settings: (K::Settings, V::Settings)) -> Result<Self> {
        let raw = File::open(file.path())?;
        let mut buf = BufReader::with_capacity(READ_BUF_SIZE, raw);

        let mut header = [0u8; HEADER_LEN];
        read_exact_frame(&mut buf, &mut header)?;
        let header = RunHeader::from_bytes(&header)?;
        let source = FrameSource::new(header.codec, buf)?;

        Ok(Self {
            source,
            file,
            settings,
            hasher: blake3::Hasher::new(),
            peeked: None,
            exhausted: false,
        })
    }

    /// The shared deletion handle for the backing file. Cloning it keeps the
    /// file on disk past this reader's lifetime.
    pub fn file(&self) -> &Arc<ScratchFile> {
        &self.file
    }

    fn read_frame(&mut self) -> Result<Option<(K, V)>> {
        let mut len4 = [0u8; 4];
        read_exact_frame(&mut self.source, &mut len4)?;
        let key_len = u32::from_le_bytes(len4);

        if key_len == SENTINEL {
            let mut footer = [0u8; CHECKSUM_LEN];
            read_exact_frame(&mut self.source, &mut footer)?;
            if footer != *self.hasher.finalize().as_bytes() {
                return Err(Error::corrupt("run file checksum mismatch"));
            }
            self.exhausted = true;
            return Ok(None);
        }
        self.hasher.update(&len4);

        read_exact_frame(&mut self.source, &mut len4)?;
        let val_len = u32::from_le_bytes(len4);
        self.hasher.update(&len4);

        if key_len > MAX_FRAME_PART || val_len > MAX_FRAME_PART {
            return Err(Error::corrupt(format!(
                "implausible frame lengths key={key_len} val={val_len}"
            )));
        }

        let mut key_bytes = vec![0u8; key_len as usize];
        read_exact_frame(&mut self.source, &mut key_bytes)?;
        self.hasher.update(&key_bytes);

        let mut val_bytes = vec![0u8; val_len as usize];
        read_exact_frame(&mut self.source, &mut val_bytes)?;
        self.hasher.update(&val_bytes);

        let key = K::deserialize(&key_bytes, &self.settings.0)?;
        let value = V::deserialize(&val_bytes, &self.settings.1)?;
        Ok(Some((key, value)))
    }
}

impl<K: Sortable, V: Sortable> SortedStream<K, V> for RunReader<K, V> {
    fn more(&mut self) -> Result<bool> {
        if self.peeked.is_none() && !self.exhausted {
            self.peeked = self.read_frame()?;
        }
        Ok(self.peeked.is_some())
    }

    fn next(&mut self) -> Result<(K, V)> {
        self.more()?;
        self.peeked.take().ok_or_else(|| {
            Error::InvalidOperation("next() called past the end of a run".into())
        })
    }
}
