//! Sequential writer for one spilled run.
//!
//! Callers must supply records in final sorted order; the writer performs no
//! sorting. Any I/O failure here aborts the whole sort — a partially written
//! run is never exposed to the merge step.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use spillsort_core::error::{Error, Result};
use spillsort_core::record::Sortable;

use crate::codec::{Codec, FrameSink};
use crate::frame::{RunHeader, SENTINEL};
use crate::reader::RunReader;
use crate::scratch::{ScratchDir, ScratchFile};

pub struct RunWriter<K: Sortable, V: Sortable> {
    sink: FrameSink,
    file: Arc<ScratchFile>,
    settings: (K::Settings, V::Settings),
    hasher: blake3::Hasher,
    key_buf: Vec<u8>,
    val_buf: Vec<u8>,
    records: u64,
}

impl<K: Sortable, V: Sortable> RunWriter<K, V> {
    /// Create a run file under `scratch` and write its header.
    ///
    /// The writer holds deletion ownership of the file until `done` transfers
    /// it to the returned reader; dropping the writer early unlinks the file.
    pub fn create(
        scratch: &ScratchDir,
        codec: Codec,
        settings: (K::Settings, V::Settings),
    ) -> Result<Self> {
        let path = scratch.next_path();
        let raw = File::create(&path)?;
        let file = ScratchFile::new(path);

        let mut buf = BufWriter::new(raw);
        buf.write_all(&RunHeader::new(codec).to_bytes())?;
        let sink = FrameSink::new(codec, buf)?;

        Ok(Self {
            sink,
            file,
            settings,
            hasher: blake3::Hasher::new(),
            key_buf: Vec::new(),
            val_buf: Vec::new(),
            records: 0,
        })
    }

    /// Append one record, assumed to follow all previously added records in
    /// the run's sort order.
    pub fn add_already_sorted(&mut self, key: &K, value: &V) -> Result<()> {
        self.key_buf.clear();
        self.val_buf.clear();
        key.serialize(&mut self.key_buf);
        value.serialize(&mut self.val_buf);

        if self.key_buf.len() as u64 >= u64::from(SENTINEL)
            || self.val_buf.len() as u64 >= u64::from(SENTINEL)
        {
            return Err(Error::InvalidOperation(
                "serialized record exceeds the frame size limit".into(),
            ));
        }

        let key_len = (self.key_buf.len() as u32).to_le_bytes();
        let val_len = (self.val_buf.len() as u32).to_le_bytes();

        self.sink.write_all(&key_len)?;
        self.sink.write_all(&val_len)?;
        self.sink.write_all(&self.key_buf)?;
        self.sink.write_all(&self.val_buf)?;

        self.hasher.update(&key_len);
        self.hasher.update(&val_len);
        self.hasher.update(&self.key_buf);
        self.hasher.update(&self.val_buf);

        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Write the footer, flush, and hand back a reader positioned at the
    /// first record. Deletion ownership of the file moves into the reader.
    pub fn done(mut self) -> Result<RunReader<K, V>> {
        self.sink.write_all(&SENTINEL.to_le_bytes())?;
        let checksum = self.hasher.finalize();
        self.sink.write_all(checksum.as_bytes())?;

        let Self {
            sink,
            file,
            settings,
            records,
            ..
        } = self;
        sink.finish()?;

        tracing::debug!(records, path = %file.path().display(), "sealed run file");
        RunReader::open(file, settings)
    }
}
