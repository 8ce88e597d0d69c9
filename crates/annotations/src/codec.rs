use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Snapshot file kept next to the project config.
pub const SNAPSHOT_FILE_NAME: &str = "zoomer-userfields.json";

/// One persisted annotation. The capitalized aliases read snapshots written by
/// earlier releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(alias = "Filename")]
    pub file: String,
    #[serde(alias = "Method")]
    pub segment: String,
    #[serde(alias = "Field")]
    pub field: String,
    #[serde(alias = "Value")]
    pub value: String,
}

#[must_use]
pub fn snapshot_path(project_root: &Path) -> PathBuf {
    project_root.join(SNAPSHOT_FILE_NAME)
}

/// `Ok(None)` when no snapshot exists yet.
pub async fn read_snapshot(path: &Path) -> Result<Option<Vec<AnnotationRecord>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write the full record list to a sibling temp file, sync it, then rename it
/// over `path`. A crash leaves either the old or the new snapshot in place;
/// a failed write removes the temp file.
pub async fn write_snapshot(path: &Path, records: &[AnnotationRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    if let Err(err) = write_synced(&tmp, &bytes).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {cleanup}", tmp.display());
            }
        }
        return Err(err.into());
    }

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.write_all(b"\n").await?;
    file.sync_all().await
}
