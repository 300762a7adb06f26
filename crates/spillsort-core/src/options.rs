//! Runtime options that control the sorter's behavior.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default in-memory budget before a spill is forced (64 MiB).
pub const DEFAULT_MAX_MEMORY_USAGE_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptions {
    /// Number of records the output may produce. 0 means no limit; N > 0
    /// means only the N smallest records under the comparator are emitted.
    pub limit: u64,

    /// Approximate budget for the unspilled in-memory buffer. Exceeding it
    /// either seals a run to disk or fails, depending on `ext_sort_allowed`.
    pub max_memory_usage_bytes: usize,

    /// If false, exceeding the budget is a hard `MemoryLimitExceeded` error
    /// instead of triggering a spill.
    pub ext_sort_allowed: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            max_memory_usage_bytes: DEFAULT_MAX_MEMORY_USAGE_BYTES,
            ext_sort_allowed: false,
        }
    }
}

impl SortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SPILLSORT_MAX_MEMORY_BYTES`: in-memory budget in bytes
    /// - `SPILLSORT_EXT_SORT_ALLOWED`: `1`/`true` to permit disk spills
    pub fn from_env() -> Self {
        let mut opts = Self::default();

        if let Ok(s) = std::env::var("SPILLSORT_MAX_MEMORY_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                opts.max_memory_usage_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("SPILLSORT_EXT_SORT_ALLOWED") {
            opts.ext_sort_allowed = s == "1" || s.eq_ignore_ascii_case("true");
        }

        opts
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_memory_usage_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_usage_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_ext_sort_allowed(mut self, allowed: bool) -> Self {
        self.ext_sort_allowed = allowed;
        self
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_memory_usage_bytes == 0 {
            return Err(Error::InvalidOperation(
                "max_memory_usage_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let opts = SortOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.limit, 0);
        assert!(!opts.ext_sort_allowed);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let opts = SortOptions::new().with_max_memory_usage_bytes(0);
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidOperation(_))
        ));
    }
}
