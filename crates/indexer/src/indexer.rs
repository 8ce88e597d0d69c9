use crate::index::{IndexedFile, ProjectIndex};
use crate::normalize::{normalize, TextEncoding};
use crate::scanner::FileScanner;
use crate::segments::{detect_segments, split_lines, SegmentPatterns};
use crate::{IndexerError, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One-shot project indexer: scan, load, normalize, segment.
pub struct ProjectIndexer {
    scanner: FileScanner,
    patterns: SegmentPatterns,
}

impl ProjectIndexer {
    pub fn new(root: impl AsRef<Path>, extensions: &[String], patterns: SegmentPatterns) -> Self {
        Self {
            scanner: FileScanner::new(root, extensions),
            patterns,
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.scanner = self.scanner.with_max_file_size(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    /// Build the full index. The first unreadable or oversized file fails the
    /// whole run; no partial index is returned.
    pub fn index(&self) -> Result<ProjectIndex> {
        let start = Instant::now();
        let root = self.scanner.root().to_path_buf();
        let mut index = ProjectIndex::new(root);

        for path in self.scanner.scan()? {
            let canonical = self.scanner.canonical_path(&path)?;
            let file = self.load_file(&path, canonical)?;
            index.insert(file);
        }

        index.stats_mut().time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let stats = index.stats();
        log::info!(
            "Indexed {} files ({} lines, {} segments, {} legacy-encoded) in {} ms",
            stats.files,
            stats.total_lines,
            stats.segments,
            stats.legacy_encoded,
            stats.time_ms
        );
        Ok(index)
    }

    fn load_file(&self, path: &Path, canonical: String) -> Result<IndexedFile> {
        let bytes = std::fs::read(path).map_err(|source| IndexerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        // The file may have grown between the walk and the read.
        let size = bytes.len() as u64;
        let limit = self.scanner.max_file_size();
        if size > limit {
            return Err(IndexerError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }

        let normalized = normalize(bytes);
        if normalized.encoding == TextEncoding::Windows1252 {
            log::debug!("{} is not valid UTF-8; decoded as Windows-1252", path.display());
        }

        let lines = split_lines(&normalized.text);
        let starts = detect_segments(&lines, &self.patterns);
        log::debug!("{canonical}: {} lines, {} segments", lines.len(), starts.len());
        Ok(IndexedFile::new(canonical, lines, starts, normalized.encoding))
    }
}

/// Convenience wrapper over [`ProjectIndexer`].
pub fn scan(
    root: impl Into<PathBuf>,
    extensions: &[String],
    patterns: SegmentPatterns,
) -> Result<ProjectIndex> {
    ProjectIndexer::new(root.into(), extensions, patterns).index()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn go_patterns() -> SegmentPatterns {
        SegmentPatterns::compile(&[r"func \(.*\) .*\(.*\).*\{", r"func .*\(.*\).*\{"]).0
    }

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_indexes_only_allowed_extensions() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "main.go", b"package main\nfunc main() {}");
        write(root, "utils/helper.go", b"package utils\nfunc helper() {}");
        write(root, "docs/readme.md", b"# README");
        write(root, "test.txt", b"text file");

        let index = scan(root, &[".go".to_string()], go_patterns()).unwrap();

        assert_eq!(index.list_files(), &["main.go", "utils/helper.go"]);
        assert!(index.get("docs/readme.md").is_none());
        assert!(index.get("test.txt").is_none());
        assert_eq!(index.segment_boundaries("main.go"), Some(&[1usize][..]));
        assert_eq!(index.stats().files, 2);
        assert_eq!(index.stats().segments, 2);
    }

    #[test]
    fn scan_normalizes_legacy_files() {
        let temp = tempdir().unwrap();
        write(temp.path(), "legacy.go", b"// \x93quoted\x94\nfunc a() {\n}");

        let index = scan(temp.path(), &[".go".to_string()], go_patterns()).unwrap();
        let file = index.get("legacy.go").unwrap();
        assert_eq!(file.lines()[0], "// \u{201C}quoted\u{201D}");
        assert_eq!(file.encoding(), TextEncoding::Windows1252);
        assert_eq!(file.segment_starts(), &[1]);
        assert_eq!(index.stats().legacy_encoded, 1);
    }

    #[test]
    fn oversized_file_fails_whole_scan() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.go", b"package a");
        write(temp.path(), "b.go", &vec![b'x'; 4096]);
        write(temp.path(), "c.go", b"package c");

        let err = ProjectIndexer::new(temp.path(), &[".go".to_string()], go_patterns())
            .with_max_file_size(1024)
            .index()
            .unwrap_err();
        match err {
            IndexerError::FileTooLarge { path, size, limit } => {
                assert!(path.ends_with("b.go"));
                assert_eq!((size, limit), (4096, 1024));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_pattern_set_gives_single_implicit_segment() {
        let temp = tempdir().unwrap();
        let body: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        write(temp.path(), "ten.go", body.join("\n").as_bytes());

        let index = scan(temp.path(), &[".go".to_string()], SegmentPatterns::default()).unwrap();
        let file = index.get("ten.go").unwrap();
        assert_eq!(file.line_count(), 10);
        assert!(file.segment_starts().is_empty());
        let spans = file.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 10));
    }

    #[test]
    fn file_lines_match_split_positions() {
        let temp = tempdir().unwrap();
        write(temp.path(), "x.go", b"func a() {\n}\n");
        let index = scan(temp.path(), &[".go".to_string()], go_patterns()).unwrap();
        assert_eq!(
            index.file_lines("x.go").unwrap(),
            &["func a() {".to_string(), "}".to_string(), String::new()]
        );
    }
}
