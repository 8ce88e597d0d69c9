//! # Zoomer Indexer
//!
//! One-shot indexing of a project tree into line-addressable, segmented files.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (extension allow-list, size limit)
//!     │      └─> Matching files
//!     │
//!     ├──> Normalizer (UTF-8, else Windows-1252)
//!     │      └─> Text lines
//!     │
//!     └──> Segment Detector (ordered regex boundaries)
//!            └─> ProjectIndex
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use zoomer_indexer::{scan, SegmentPatterns};
//!
//! let (patterns, _warnings) = SegmentPatterns::compile(&[r"func .*\(.*\).*\{"]);
//! let index = scan("/path/to/project", &[".go".to_string()], patterns)?;
//! for file in index.iter() {
//!     println!("{}: {} segments", file.path(), file.segment_starts().len());
//! }
//! # Ok::<(), zoomer_indexer::IndexerError>(())
//! ```

mod error;
mod index;
mod indexer;
mod normalize;
mod scanner;
mod segments;
mod stats;

pub use error::{IndexerError, Result};
pub use index::{IndexedFile, ProjectIndex, SegmentSpan};
pub use indexer::{scan, ProjectIndexer};
pub use normalize::{decode_windows1252, normalize, NormalizedText, TextEncoding};
pub use scanner::{canonical_relative_path, file_extension, FileScanner, MAX_FILE_SIZE_BYTES};
pub use segments::{detect_segments, segment_label, split_lines, PatternWarning, SegmentPatterns};
pub use stats::IndexStats;
