use anyhow::{Context as AnyhowContext, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zoomer_annotations::{check_component, snapshot_path, AnnotationStore};
use zoomer_config::{load_or_bootstrap, ConfigSource, ProjectConfig};
use zoomer_indexer::{PatternWarning, ProjectIndex, ProjectIndexer, SegmentPatterns};

/// Everything one review session needs, owned in one place and shared by handle.
pub struct ReviewApp {
    root: PathBuf,
    config: ProjectConfig,
    config_source: ConfigSource,
    index: Arc<ProjectIndex>,
    store: Arc<AnnotationStore>,
    snapshot_path: PathBuf,
    pattern_warnings: Vec<PatternWarning>,
}

impl ReviewApp {
    /// Load config (bootstrapping it if absent), run the full scan, then load
    /// annotations. Config and scan failures are fatal; annotation load is not.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            anyhow::bail!("Invalid path: {} is not a directory", root.display());
        }
        log::info!("Project path: {}", root.display());

        let (config, config_source) = load_or_bootstrap(&root)
            .with_context(|| format!("Failed to load config for {}", root.display()))?;
        for field in &config.user_fields {
            check_component("field", &field.name)
                .with_context(|| format!("Invalid user field '{}'", field.name))?;
        }

        let (patterns, pattern_warnings) = SegmentPatterns::compile(&config.method_filter);
        if patterns.is_empty() {
            log::warn!("No usable segment patterns; every file is a single segment");
        }

        let index = index_project(&root, &config.ext_filter, patterns).await?;

        let snapshot_path = snapshot_path(&root);
        let store = AnnotationStore::load(&snapshot_path).await;

        Ok(Self {
            root,
            config,
            config_source,
            index: Arc::new(index),
            store: Arc::new(store),
            snapshot_path,
            pattern_warnings,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_source(&self) -> &ConfigSource {
        &self.config_source
    }

    pub fn index(&self) -> &Arc<ProjectIndex> {
        &self.index
    }

    pub fn store(&self) -> &Arc<AnnotationStore> {
        &self.store
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn pattern_warnings(&self) -> &[PatternWarning] {
        &self.pattern_warnings
    }
}

/// Run the blocking scan off the async runtime.
pub async fn index_project(
    root: &Path,
    extensions: &[String],
    patterns: SegmentPatterns,
) -> Result<ProjectIndex> {
    let indexer = ProjectIndexer::new(root, extensions, patterns);
    tokio::task::spawn_blocking(move || indexer.index())
        .await
        .context("Index task panicked")?
        .with_context(|| format!("Failed to index {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;
    use zoomer_config::{config_path, write_config, FieldDefinition, FieldKind};

    #[tokio::test]
    async fn first_run_bootstraps_config_and_indexes_go_files() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("main.go"),
            "package main\n\nfunc main() {\n}\n\nfunc (s *Server) Run() error {\n\treturn nil\n}\n",
        )
        .unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let app = ReviewApp::open(temp.path()).await.unwrap();

        assert!(matches!(app.config_source(), ConfigSource::Bootstrapped(_)));
        assert!(app.pattern_warnings().is_empty());
        assert_eq!(app.index().list_files(), &["main.go"]);
        assert_eq!(app.index().segment_boundaries("main.go"), Some(&[2usize, 5][..]));
        assert!(app.store().is_empty());
    }

    #[tokio::test]
    async fn invalid_patterns_warn_but_do_not_fail() {
        let temp = tempdir().unwrap();
        let config = ProjectConfig {
            method_filter: vec!["(broken".to_string(), "^fn ".to_string()],
            ext_filter: vec![".rs".to_string()],
            ..Default::default()
        };
        write_config(&config_path(temp.path()), &config).unwrap();
        fs::write(temp.path().join("lib.rs"), "use a;\nfn b() {}\n").unwrap();

        let app = ReviewApp::open(temp.path()).await.unwrap();
        assert_eq!(app.pattern_warnings().len(), 1);
        assert_eq!(app.index().segment_boundaries("lib.rs"), Some(&[1usize][..]));
    }

    #[tokio::test]
    async fn config_written_by_earlier_releases_still_segments() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("zoomer-config.json"),
            r#"{
                "lang_highlight": "go",
                "ext_filter": [".go"],
                "method_filter": ["func (\\(.*\\))?(.*)\\(.*?\\).*{"],
                "user_fields": [{"Name": "Checked", "Type": "boolean"}]
            }"#,
        )
        .unwrap();
        fs::write(temp.path().join("main.go"), "package main\nfunc main() {\n}\n").unwrap();

        let app = ReviewApp::open(temp.path()).await.unwrap();

        assert!(matches!(app.config_source(), ConfigSource::Loaded(_)));
        assert_eq!(app.config().project_name, "New Project");
        assert!(app.pattern_warnings().is_empty());
        assert_eq!(app.index().segment_boundaries("main.go"), Some(&[1usize][..]));
    }

    #[tokio::test]
    async fn scan_failure_is_fatal() {
        let temp = tempdir().unwrap();
        let sub = temp.path().join("pkg");
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join("huge.go"),
            vec![b'x'; (zoomer_indexer::MAX_FILE_SIZE_BYTES + 1) as usize],
        )
        .unwrap();

        let err = ReviewApp::open(temp.path()).await.err().unwrap();
        assert!(format!("{err:#}").contains("file too large"));
    }

    #[tokio::test]
    async fn delimiter_in_field_name_is_rejected() {
        let temp = tempdir().unwrap();
        let config = ProjectConfig {
            user_fields: vec![FieldDefinition::new("a<>b", FieldKind::Text)],
            ..Default::default()
        };
        write_config(&config_path(temp.path()), &config).unwrap();
        assert!(ReviewApp::open(temp.path()).await.is_err());
    }

    #[tokio::test]
    async fn missing_root_is_rejected() {
        let temp = tempdir().unwrap();
        assert!(ReviewApp::open(temp.path().join("nope")).await.is_err());
    }
}
