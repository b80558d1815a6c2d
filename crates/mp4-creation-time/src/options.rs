use serde::{Deserialize, Serialize};

/// Default number of bytes read per backward step.
pub const DEFAULT_CHUNK_SIZE: u64 = 100_000;

/// Default cap on the number of bytes a single scan examines.
pub const DEFAULT_MAX_BYTES: u64 = 100_000_000;

/// Controls how much of a source a backward scan reads.
///
/// The scan walks from the tail of the source towards its head, one chunk at
/// a time, and gives up once `max_bytes` worth of chunks have been examined.
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Nominal size of each window read from the source
    pub chunk_size: u64,
    /// Total budget of bytes examined across all windows
    pub max_bytes: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl ScanOptions {
    /// Specifies the size of each backward step.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Specifies the maximum number of bytes to examine.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Scan the whole source regardless of its size.
    pub fn unbounded(self) -> Self {
        self.with_max_bytes(u64::MAX)
    }
}
