//! Persistent guide cache
//!
//! Every operation is best-effort. A missing, corrupt or version-mismatched
//! store reads as empty, and a failed write is logged and dropped; neither
//! ever reaches the request path. Writes take an exclusive lock on a sibling
//! `.lock` file, reload the store and merge their single entry, so concurrent
//! writers to different keys never drop each other's entries.

use crate::cache_key::{CacheKey, CACHE_VERSION};
use crate::types::GuideSource;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// One cached guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub result: String,
    #[serde(default)]
    pub source: GuideSource,
    #[serde(default)]
    pub selected_sensors: Vec<String>,
    #[serde(default)]
    pub selected_outputs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// New entry stamped now; component lists are stored sorted
    pub fn new(
        result: String,
        source: GuideSource,
        sensors: &[&str],
        outputs: &[&str],
    ) -> Self {
        let sorted = |names: &[&str]| {
            let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
            v.sort();
            v
        };
        Self {
            result,
            source,
            selected_sensors: sorted(sensors),
            selected_outputs: sorted(outputs),
            created_at: Utc::now(),
        }
    }

    /// Only non-blank results may be served
    pub fn is_usable(&self) -> bool {
        !self.result.trim().is_empty()
    }
}

/// Whole persisted store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, CacheEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
            updated_at: None,
        }
    }
}

impl CacheDocument {
    /// Usable entry for `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key.as_str()).filter(|e| e.is_usable())
    }

    /// Insert or overwrite a single entry and stamp the document
    pub fn insert(&mut self, key: &CacheKey, entry: CacheEntry) {
        self.entries.insert(key.as_str().to_string(), entry);
        self.version = CACHE_VERSION;
        self.updated_at = Some(Utc::now());
    }
}

/// Failures while reading or writing the store. None of these escape `GuideCache`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cache version {found} does not match expected {expected}")]
    VersionMismatch { found: String, expected: u32 },

    #[error("timed out waiting for cache lock ({0}s)")]
    LockTimeout(u64),
}

/// Key-value store for generated guides
pub trait GuideCache: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current persisted state; never fails
    fn load(&self) -> CacheDocument;

    /// Merge one entry into freshly loaded state; never fails
    fn put(&self, key: &CacheKey, entry: CacheEntry);

    /// Convenience lookup over a fresh `load`
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.load().get(key).cloned()
    }
}

/// Flat JSON file store with reload-merge-write discipline
pub struct FileGuideCache {
    path: PathBuf,
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

const LOCK_TIMEOUT_SECS: u64 = 5;
const LOCK_RETRY_MS: u64 = 10;

/// Held for the whole reload-merge-write; released on drop
struct CacheLock {
    file: File,
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileGuideCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Exclusive lock shared by every writer of this path, in or out of process
    fn lock(&self) -> Result<CacheLock, CacheError> {
        ensure_parent(&self.path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;

        let start = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(CacheLock { file }),
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() >= Duration::from_secs(LOCK_TIMEOUT_SECS) {
                        return Err(CacheError::LockTimeout(LOCK_TIMEOUT_SECS));
                    }
                    std::thread::sleep(Duration::from_millis(LOCK_RETRY_MS));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Strict read; `load` turns every error into an empty document
    pub fn try_load(&self) -> Result<CacheDocument, CacheError> {
        if !self.path.exists() {
            return Ok(CacheDocument::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let raw: serde_json::Value = serde_json::from_str(&content)?;

        let version = raw.get("version");
        if version.and_then(|v| v.as_u64()) != Some(CACHE_VERSION as u64) {
            return Err(CacheError::VersionMismatch {
                found: version.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string()),
                expected: CACHE_VERSION,
            });
        }

        Ok(serde_json::from_value(raw)?)
    }

    fn try_put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let _lock = self.lock()?;
        let mut doc = self.load();
        doc.insert(key, entry);
        let content = serde_json::to_string_pretty(&doc)?;
        write_atomic(&self.path, &content)?;
        debug!("Cache written: {} entries -> {}", doc.entries.len(), self.path.display());
        Ok(())
    }
}

impl GuideCache for FileGuideCache {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self) -> CacheDocument {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Guide cache at {} is unusable, starting empty: {}", self.path.display(), e);
                CacheDocument::default()
            }
        }
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) {
        if let Err(e) = self.try_put(key, entry) {
            warn!("Failed to write guide cache {}: {}", self.path.display(), e);
        }
    }
}

/// Write through a sibling temp file and rename over the target
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    ensure_parent(path)?;

    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(format!(".{}.{}.tmp", std::process::id(), n));
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// In-process store behind a lock; nothing survives a restart
#[derive(Default)]
pub struct MemoryGuideCache {
    doc: RwLock<CacheDocument>,
}

impl MemoryGuideCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuideCache for MemoryGuideCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> CacheDocument {
        match self.doc.read() {
            Ok(doc) => doc.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) {
        let mut doc = match self.doc.write() {
            Ok(doc) => doc,
            Err(poisoned) => poisoned.into_inner(),
        };
        doc.insert(key, entry);
    }
}
