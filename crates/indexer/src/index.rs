use crate::normalize::TextEncoding;
use crate::segments::segment_label;
use crate::IndexStats;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One loaded, segmented file. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedFile {
    path: String,
    lines: Vec<String>,
    segment_starts: Vec<usize>,
    encoding: TextEncoding,
}

/// A contiguous run of lines `[start, end)`. `label` is `None` for the
/// preamble that precedes the first detected boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub label: Option<&'a str>,
}

impl IndexedFile {
    /// `segment_starts` must be strictly increasing and within `lines`.
    pub fn new(
        path: impl Into<String>,
        lines: Vec<String>,
        segment_starts: Vec<usize>,
        encoding: TextEncoding,
    ) -> Self {
        debug_assert!(segment_starts.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(segment_starts.iter().all(|&idx| idx < lines.len()));
        Self {
            path: path.into(),
            lines,
            segment_starts,
            encoding,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Label of the segment opening at line `line_idx`, if that line is a boundary.
    pub fn segment_label(&self, line_idx: usize) -> Option<&str> {
        self.segment_starts
            .binary_search(&line_idx)
            .ok()
            .map(|_| segment_label(&self.lines[line_idx]))
    }

    /// Every span of the file in order, the preamble first when non-empty.
    /// A file with no boundaries is one implicit, unlabeled span.
    pub fn spans(&self) -> Vec<SegmentSpan<'_>> {
        let mut spans = Vec::with_capacity(self.segment_starts.len() + 1);
        let first = self
            .segment_starts
            .first()
            .copied()
            .unwrap_or(self.lines.len());
        if first > 0 {
            spans.push(SegmentSpan {
                start: 0,
                end: first,
                label: None,
            });
        }

        for (i, &start) in self.segment_starts.iter().enumerate() {
            let end = self
                .segment_starts
                .get(i + 1)
                .copied()
                .unwrap_or(self.lines.len());
            spans.push(SegmentSpan {
                start,
                end,
                label: Some(segment_label(&self.lines[start])),
            });
        }
        spans
    }

    pub fn span_lines(&self, span: &SegmentSpan<'_>) -> &[String] {
        &self.lines[span.start..span.end]
    }
}

/// Read-only result of a full scan: ordered canonical paths plus the files.
#[derive(Debug, Clone)]
pub struct ProjectIndex {
    root: PathBuf,
    order: Vec<String>,
    files: HashMap<String, IndexedFile>,
    stats: IndexStats,
}

impl ProjectIndex {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            order: Vec::new(),
            files: HashMap::new(),
            stats: IndexStats::new(),
        }
    }

    pub(crate) fn insert(&mut self, file: IndexedFile) {
        self.stats.add_file(
            file.line_count(),
            file.segment_starts().len(),
            file.encoding() == TextEncoding::Windows1252,
        );
        let key = file.path().to_string();
        if self.files.insert(key.clone(), file).is_none() {
            self.order.push(key);
        }
    }

    pub(crate) fn stats_mut(&mut self) -> &mut IndexStats {
        &mut self.stats
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Canonical paths in scan order.
    pub fn list_files(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, path: &str) -> Option<&IndexedFile> {
        self.files.get(path)
    }

    pub fn file_lines(&self, path: &str) -> Option<&[String]> {
        self.get(path).map(IndexedFile::lines)
    }

    pub fn segment_boundaries(&self, path: &str) -> Option<&[usize]> {
        self.get(path).map(IndexedFile::segment_starts)
    }

    /// Files in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedFile> {
        self.order.iter().filter_map(|path| self.files.get(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(lines: &[&str], starts: Vec<usize>) -> IndexedFile {
        IndexedFile::new(
            "src/a.go",
            lines.iter().map(|s| s.to_string()).collect(),
            starts,
            TextEncoding::Utf8,
        )
    }

    #[test]
    fn no_boundaries_means_one_implicit_segment() {
        let lines: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        let file = IndexedFile::new("a.txt", lines, Vec::new(), TextEncoding::Utf8);
        let spans = file.spans();
        assert_eq!(
            spans,
            vec![SegmentSpan {
                start: 0,
                end: 10,
                label: None
            }]
        );
        assert_eq!(file.span_lines(&spans[0]).len(), 10);
    }

    #[test]
    fn spans_cover_preamble_and_segments() {
        let file = file(
            &["package main", "", "func a() {\r", "}", "func b() {", "}"],
            vec![2, 4],
        );
        let spans = file.spans();
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].start, spans[0].end, spans[0].label), (0, 2, None));
        assert_eq!(
            (spans[1].start, spans[1].end, spans[1].label),
            (2, 4, Some("func a() {"))
        );
        assert_eq!(
            (spans[2].start, spans[2].end, spans[2].label),
            (4, 6, Some("func b() {"))
        );
    }

    #[test]
    fn boundary_on_first_line_has_no_preamble() {
        let file = file(&["func a() {", "}"], vec![0]);
        let spans = file.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, Some("func a() {"));
        assert_eq!(file.segment_label(0), Some("func a() {"));
        assert_eq!(file.segment_label(1), None);
    }
}
