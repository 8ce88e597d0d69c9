use crate::{IndexerError, Result};
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files above this size abort the scan instead of being loaded.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024; // 10 MB

/// Scanner for finding files with allowed extensions in a project
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    extensions: Vec<String>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, extensions: &[String]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: extensions.to_vec(),
            max_file_size: MAX_FILE_SIZE_BYTES,
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Walk the tree depth-first. Within a directory, regular files come before
    /// subdirectories and both are visited in file-name order. Any walk error
    /// or oversized match aborts the whole scan.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(self.root.display().to_string()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by(files_before_dirs);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.is_allowed(path) {
                continue;
            }

            let size = entry.metadata()?.len();
            if size > self.max_file_size {
                return Err(IndexerError::FileTooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit: self.max_file_size,
                });
            }

            files.push(path.to_path_buf());
        }

        log::info!(
            "Found {} matching files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    /// Dot-inclusive, case-sensitive comparison against the allow-list.
    pub fn is_allowed(&self, path: &Path) -> bool {
        let Some(ext) = file_extension(path) else {
            return false;
        };
        self.extensions.iter().any(|candidate| candidate == ext)
    }

    /// Identifier of `path` relative to the root, `/`-separated.
    pub fn canonical_path(&self, path: &Path) -> Result<String> {
        canonical_relative_path(&self.root, path)
    }
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    a_dir
        .cmp(&b_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Extension of the final path element from its last `.`, dot included.
/// `archive.tar.gz` gives `.gz`; `.bashrc` gives `.bashrc`; `Makefile` has none.
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let dot = name.rfind('.')?;
    Some(&name[dot..])
}

pub fn canonical_relative_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        IndexerError::InvalidPath(format!(
            "{} is outside project root {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().replace('\\', "/")),
            Component::CurDir => {}
            other => {
                return Err(IndexerError::InvalidPath(format!(
                    "unexpected path component {other:?} in {}",
                    path.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}
