use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Config file kept in the project root.
pub const CONFIG_FILE_NAME: &str = "zoomer-config.json";

const DEFAULT_PROJECT_NAME: &str = "New Project";

/// Go method declarations: `func name(...) ... {` and `func (recv) name(...) ... {`.
pub const DEFAULT_METHOD_PATTERN: &str = r"func (\(.*\))?(.*)\(.*?\).*\{";

/// Review project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Title shown on the review page
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Highlighter language class for code blocks (empty = none)
    #[serde(default)]
    pub lang_highlight: String,

    /// File extensions to index, dot-inclusive and case-sensitive (`.go`).
    /// Missing reads as empty and is rejected by [`ProjectConfig::validate`].
    #[serde(default)]
    pub ext_filter: Vec<String>,

    /// Ordered regex sources; a line matching any of them opens a segment
    #[serde(default)]
    pub method_filter: Vec<String>,

    /// Fields shown for every segment
    #[serde(default)]
    pub user_fields: Vec<FieldDefinition>,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Type")]
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Closed set of field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Checkbox; stored as `"1"` when checked
    #[serde(rename = "boolean")]
    Boolean,

    /// Free-form text area
    #[serde(rename = "textbox")]
    Text,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            lang_highlight: "go".to_string(),
            ext_filter: vec![".go".to_string()],
            method_filter: vec![DEFAULT_METHOD_PATTERN.to_string()],
            user_fields: vec![FieldDefinition::new("Checked", FieldKind::Boolean)],
        }
    }
}

impl ProjectConfig {
    /// Validate structural rules; regex validity is checked later and only warns.
    pub fn validate(&self) -> Result<()> {
        if self.ext_filter.is_empty() {
            return Err(ConfigError::invalid_config(
                "ext_filter must list at least one extension",
            ));
        }

        for ext in &self.ext_filter {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::invalid_config(format!(
                    "extension '{ext}' must start with '.' (e.g. \".go\")"
                )));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.user_fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::invalid_config("user field names must be non-empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::invalid_config(format!(
                    "duplicate user field '{}'",
                    field.name
                )));
            }
        }

        Ok(())
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Loaded(PathBuf),
    /// No config existed; defaults were written here
    Bootstrapped(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Loaded(path) | ConfigSource::Bootstrapped(path) => path,
        }
    }
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE_NAME)
}

pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let bytes = std::fs::read(path).map_err(|err| ConfigError::io(path, err))?;
    let config: ProjectConfig =
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &ProjectConfig) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(config)?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).map_err(|err| ConfigError::io(path, err))
}

/// Load `zoomer-config.json` from the project root, writing the default
/// configuration first when none exists.
pub fn load_or_bootstrap(project_root: &Path) -> Result<(ProjectConfig, ConfigSource)> {
    let path = config_path(project_root);
    if path.is_file() {
        let config = load_config(&path)?;
        log::info!("Config loaded ({})", config.project_name);
        return Ok((config, ConfigSource::Loaded(path)));
    }

    log::info!("Creating config file: {}", path.display());
    let config = ProjectConfig::default();
    write_config(&path, &config)?;
    Ok((config, ConfigSource::Bootstrapped(path)))
}
