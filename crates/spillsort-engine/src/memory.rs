//! Lightweight peak-usage tracking for diagnostics.
//!
//! Observability only; budget enforcement happens in the facade itself.

#[derive(Debug, Default)]
pub struct PeakTracker {
    peak_bytes: usize,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new "used bytes" value; updates the peak if higher.
    pub fn record_used(&mut self, used_bytes: usize) {
        if used_bytes > self.peak_bytes {
            self.peak_bytes = used_bytes;
        }
    }

    pub fn peak(&self) -> usize {
        self.peak_bytes
    }
}
