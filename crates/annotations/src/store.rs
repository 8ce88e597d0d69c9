use crate::clock::StoreClock;
use crate::codec::{read_snapshot, write_snapshot, AnnotationRecord};
use crate::key::AnnotationKey;
use crate::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing changed since the last successful flush.
    Skipped,
    Written { records: usize },
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<AnnotationKey, String>,
    clock: StoreClock,
}

impl StoreState {
    fn snapshot(&self) -> Vec<AnnotationRecord> {
        self.records
            .iter()
            .map(|(key, value)| AnnotationRecord {
                file: key.file().to_string(),
                segment: key.segment().to_string(),
                field: key.field().to_string(),
                value: value.clone(),
            })
            .collect()
    }
}

/// Reviewer annotations keyed by (file, segment, field).
///
/// One coarse mutex guards the map and the clock; no I/O happens while it is
/// held. Flushes are serialized separately so two writers never race on the
/// temp file.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    state: Mutex<StoreState>,
    flush_gate: tokio::sync::Mutex<()>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean store from persisted records. Records with an invalid
    /// identity are dropped; later duplicates win.
    pub fn from_records(records: Vec<AnnotationRecord>) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            match AnnotationKey::new(record.file, record.segment, record.field) {
                Ok(key) => {
                    map.insert(key, record.value);
                }
                Err(err) => log::warn!("Dropping stored annotation: {err}"),
            }
        }
        Self {
            state: Mutex::new(StoreState {
                records: map,
                clock: StoreClock::new(),
            }),
            flush_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Load the snapshot at `path`. A missing, unreadable or undecodable
    /// snapshot yields an empty store; annotations are never required to start.
    pub async fn load(path: &Path) -> Self {
        match read_snapshot(path).await {
            Ok(Some(records)) => {
                let store = Self::from_records(records);
                log::info!(
                    "Loaded {} annotations from {}",
                    store.len(),
                    path.display()
                );
                store
            }
            Ok(None) => {
                log::info!(
                    "No annotation snapshot at {}; starting empty",
                    path.display()
                );
                Self::new()
            }
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable annotation snapshot {}: {err}",
                    path.display()
                );
                Self::new()
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert one value. Rejected identities leave the store untouched.
    pub fn set(&self, file: &str, segment: &str, field: &str, value: &str) -> Result<()> {
        let key = AnnotationKey::new(file, segment, field)?;
        self.set_key(key, value);
        Ok(())
    }

    /// Upsert by encoded identity (`file<>segment<>field`).
    pub fn set_encoded(&self, encoded: &str, value: &str) -> Result<AnnotationKey> {
        let key = AnnotationKey::decompose(encoded)?;
        self.set_key(key.clone(), value);
        Ok(key)
    }

    pub fn set_key(&self, key: AnnotationKey, value: &str) {
        let mut state = self.state();
        state.records.insert(key, value.to_string());
        state.clock.mark_changed();
    }

    /// Empty string when the field was never set.
    pub fn get(&self, file: &str, segment: &str, field: &str) -> String {
        // An identity that could never be stored has no value.
        match AnnotationKey::new(file, segment, field) {
            Ok(key) => self.get_key(&key),
            Err(_) => String::new(),
        }
    }

    pub fn get_key(&self, key: &AnnotationKey) -> String {
        self.state().records.get(key).cloned().unwrap_or_default()
    }

    pub fn get_encoded(&self, encoded: &str) -> Result<String> {
        let key = AnnotationKey::decompose(encoded)?;
        Ok(self.get_key(&key))
    }

    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.state().clock.is_dirty()
    }

    pub fn clock(&self) -> StoreClock {
        self.state().clock
    }

    /// All records sorted by identity.
    pub fn records(&self) -> Vec<AnnotationRecord> {
        self.state().snapshot()
    }

    /// Persist to `path` when dirty. The record list is copied under the lock
    /// and written after releasing it; sets made meanwhile keep the store dirty
    /// for the next flush. On failure the store stays dirty.
    pub async fn flush(&self, path: &Path) -> Result<FlushOutcome> {
        let _gate = self.flush_gate.lock().await;

        let (records, seq) = {
            let state = self.state();
            if !state.clock.is_dirty() {
                log::debug!("No annotation changes to save");
                return Ok(FlushOutcome::Skipped);
            }
            (state.snapshot(), state.clock.change_seq())
        };

        write_snapshot(path, &records).await?;
        self.state().clock.mark_saved(seq);
        log::info!("Saved {} annotations to {}", records.len(), path.display());
        Ok(FlushOutcome::Written {
            records: records.len(),
        })
    }
}
