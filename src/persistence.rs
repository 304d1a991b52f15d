//! Flat key/value persistence for learned counters and rejections.
//!
//! Each table is a JSON object mapping a string key to a positive count:
//! ```text
//! {"bonjour": 4, "merci": 2}
//! ```
//! Tables are read wholesale at startup and rewritten wholesale on flush.
//! Where the bytes live is up to the [`StateStore`] implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Backing storage for persisted tables.
pub trait StateStore: Send {
    /// Raw contents of `table`, or `None` if it was never written.
    fn read(&self, table: &str) -> Result<Option<String>, StoreError>;

    /// Replace the contents of `table`.
    fn write(&mut self, table: &str, contents: &str) -> Result<(), StoreError>;
}

/// One `<table>.json` file per table inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/bilingual-autocorrect`, e.g. `~/.local/share/bilingual-autocorrect`.
    pub fn default_location() -> Result<Self, StoreError> {
        let mut dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        dir.push("bilingual-autocorrect");
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }
}

impl StateStore for FileStore {
    fn read(&self, table: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, table: &str, contents: &str) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        // Write then rename so a crash never leaves a half-written table.
        let path = self.path_for(table);
        let tmp = self.dir.join(format!("{table}.json.tmp"));
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!("wrote table {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}

/// In-memory store; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<AHashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, table: &str) -> Option<String> {
        self.tables.lock().get(table).cloned()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, table: &str) -> Result<Option<String>, StoreError> {
        Ok(self.tables.lock().get(table).cloned())
    }

    fn write(&mut self, table: &str, contents: &str) -> Result<(), StoreError> {
        self.tables
            .lock()
            .insert(table.to_string(), contents.to_string());
        Ok(())
    }
}

/// Serialize a count table with keys in sorted order.
pub fn encode_table(table: &AHashMap<String, u32>) -> Result<String, StoreError> {
    let sorted: BTreeMap<&str, u32> = table.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    Ok(serde_json::to_string(&sorted)?)
}

/// Parse a count table. Any bad key or zero count rejects the whole table.
pub fn decode_table(
    table: &str,
    contents: &str,
    valid_key: impl Fn(&str) -> bool,
) -> Result<AHashMap<String, u32>, StoreError> {
    let raw: BTreeMap<String, u32> = serde_json::from_str(contents)?;
    let mut decoded = AHashMap::with_capacity(raw.len());
    for (key, count) in raw {
        if count == 0 || !valid_key(&key) {
            return Err(StoreError::Malformed {
                table: table.to_string(),
                reason: format!("bad entry {key:?} -> {count}"),
            });
        }
        decoded.insert(key, count);
    }
    Ok(decoded)
}

/// Read and decode a table, degrading to an empty table on any failure.
pub fn load_table(
    store: &dyn StateStore,
    table: &str,
    valid_key: impl Fn(&str) -> bool,
) -> AHashMap<String, u32> {
    let contents = match store.read(table) {
        Ok(Some(contents)) => contents,
        Ok(None) => return AHashMap::new(),
        Err(err) => {
            warn!("failed to read table {table}, starting empty: {err}");
            return AHashMap::new();
        }
    };
    match decode_table(table, &contents, valid_key) {
        Ok(decoded) => {
            debug!("loaded table {table} with {} entries", decoded.len());
            decoded
        }
        Err(err) => {
            warn!("discarding malformed table {table}: {err}");
            AHashMap::new()
        }
    }
}
