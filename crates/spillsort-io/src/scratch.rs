//! Scratch directory and shared-ownership temp file deletion.
//!
//! Run files are created under a process-wide scratch root with names that
//! cannot collide across concurrent sorters (per-process counter plus a
//! random suffix). Deletion is never an explicit call site responsibility:
//! whoever holds the last `Arc<ScratchFile>` unlinks the file on drop, which
//! covers normal exhaustion, error unwinding, and abandonment alike.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use spillsort_core::error::Result;

/// File extension for spilled runs.
pub const RUN_EXT: &str = "run";

/// A directory that hands out unique paths for run files.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    next: AtomicU64,
}

impl ScratchDir {
    /// Open (creating if needed) a scratch directory at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            next: AtomicU64::new(0),
        })
    }

    /// Resolve the scratch root from `SPILLSORT_SCRATCH_DIR`, falling back
    /// to a `spillsort` subdirectory of the OS temp dir.
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var("SPILLSORT_SCRATCH_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::temp_dir().join("spillsort"),
        };
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh path for one run file. Unique across sorters in this process
    /// (counter) and across processes sharing the directory (uuid suffix).
    pub fn next_path(&self) -> PathBuf {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        let tag = uuid::Uuid::new_v4().simple();
        self.root.join(format!("sort.{seq}.{tag}.{RUN_EXT}"))
    }

    /// Best-effort removal of leftover run files from prior crashed runs.
    ///
    /// This is a startup-time operational safeguard only; live files are
    /// reclaimed through `ScratchFile` ownership, never through sweeping.
    /// Returns the number of files removed.
    pub fn sweep(&self) -> Result<usize> {
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RUN_EXT)
                && fs::remove_file(&path).is_ok()
            {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, root = %self.root.display(), "swept stale run files");
        }
        Ok(removed)
    }

    /// Count run files currently present (diagnostics and tests).
    pub fn live_files(&self) -> Result<usize> {
        let mut n = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) == Some(RUN_EXT) {
                n += 1;
            }
        }
        Ok(n)
    }
}

/// Deletion responsibility for one on-disk run file.
///
/// Cloning the surrounding `Arc` shares ownership; the backing file is
/// unlinked exactly once, when the last clone drops.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub(crate) fn new(path: PathBuf) -> Arc<Self> {
        Arc::new(Self { path })
    }

    /// Take deletion ownership of an existing file.
    pub fn adopt(path: PathBuf) -> Arc<Self> {
        Arc::new(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "removed run file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove run file");
            }
        }
    }
}
