use serde::{Deserialize, Serialize};

/// Statistics about one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of files indexed
    pub files: usize,

    /// Total lines across indexed files
    pub total_lines: usize,

    /// Detected segment boundaries across indexed files
    pub segments: usize,

    /// Files decoded through the legacy codepage
    pub legacy_encoded: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, lines: usize, segments: usize, legacy: bool) {
        self.files += 1;
        self.total_lines += lines;
        self.segments += segments;
        if legacy {
            self.legacy_encoded += 1;
        }
    }
}
