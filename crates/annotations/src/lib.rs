//! # Zoomer Annotations
//!
//! Reviewer-entered values attached to one field of one segment of one file.
//!
//! ```text
//! set/get ──> AnnotationStore (Mutex<BTreeMap<AnnotationKey, String>> + StoreClock)
//!                  │
//!                  └──> FlushScheduler (interval tick, when dirty)
//!                           └─> codec: JSON → temp file → rename
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zoomer_annotations::{snapshot_path, AnnotationStore, FlushConfig, FlushScheduler};
//!
//! #[tokio::main]
//! async fn main() -> zoomer_annotations::Result<()> {
//!     let path = snapshot_path("/path/to/project".as_ref());
//!     let store = Arc::new(AnnotationStore::load(&path).await);
//!     let scheduler = FlushScheduler::start(store.clone(), path, FlushConfig::default());
//!
//!     store.set("main.go", "func main() {", "Checked", "1")?;
//!     scheduler.shutdown().await;
//!     Ok(())
//! }
//! ```

mod clock;
mod codec;
mod error;
mod flush;
mod key;
mod store;

pub use clock::StoreClock;
pub use codec::{read_snapshot, snapshot_path, write_snapshot, AnnotationRecord, SNAPSHOT_FILE_NAME};
pub use error::{AnnotationError, Result};
pub use flush::{
    FlushConfig, FlushHealth, FlushScheduler, DEFAULT_FLUSH_INTERVAL, MIN_FLUSH_INTERVAL,
};
pub use key::{check_component, compose, AnnotationKey, KEY_DELIMITER};
pub use store::{AnnotationStore, FlushOutcome};
