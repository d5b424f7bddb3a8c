//! Identity store: file-per-record persistence with an in-memory cache
//!
//! Each identity lives at `<users_dir>/<UID>.json` with body
//! `{"uid": "...", "name": "..."}`. The whole directory is loaded into a
//! map at startup; the files remain the durable source of truth and are
//! written before the cache is advanced.

use gatelog_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Persisted identity record, UTF-8 byte-exact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub uid: String,
    pub name: String,
}

/// Maps token identifiers to display names.
///
/// The cache is guarded by an RwLock so a management upsert and a scan
/// lookup never observe a half-updated record.
pub struct IdentityStore {
    users_dir: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl IdentityStore {
    pub fn new(users_dir: PathBuf) -> Self {
        Self {
            users_dir,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load all persisted records into the cache.
    ///
    /// Creates the users directory if absent. A record that fails to read
    /// or parse is skipped with a warning; the rest of the load continues.
    /// Returns the number of records loaded.
    pub fn load(&self) -> Result<usize> {
        std::fs::create_dir_all(&self.users_dir)?;

        let mut loaded = HashMap::new();
        for entry in std::fs::read_dir(&self.users_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => {
                    // Out-of-band files may carry lowercase uids; key them
                    // the same way scanned identifiers are normalized
                    let uid = crate::scanner::normalize_uid(&record.uid);
                    if uid.is_empty() {
                        warn!("Skipping identity record {} with empty uid", path.display());
                        continue;
                    }
                    debug!("Loaded identity {} -> {}", uid, record.name);
                    loaded.insert(uid, record.name);
                }
                Err(e) => {
                    warn!("Skipping malformed identity record {}: {}", path.display(), e);
                }
            }
        }

        let count = loaded.len();
        let mut cache = self.cache.write().expect("identity cache poisoned");
        *cache = loaded;
        Ok(count)
    }

    /// Resolve a token identifier to its display name.
    pub fn lookup(&self, uid: &str) -> Option<String> {
        let cache = self.cache.read().expect("identity cache poisoned");
        cache.get(uid).cloned()
    }

    /// Create or update an identity record.
    ///
    /// The file is persisted first; the cache only advances on persisted
    /// success, so a storage failure leaves both sides unchanged.
    /// Field validation (non-empty uid/name) belongs to the caller.
    pub fn upsert(&self, uid: &str, name: &str) -> Result<()> {
        let record = IdentityRecord {
            uid: uid.to_string(),
            name: name.to_string(),
        };
        let path = self.record_path(uid);
        let json = serde_json::to_string(&record)?;
        std::fs::write(&path, json)?;

        let mut cache = self.cache.write().expect("identity cache poisoned");
        cache.insert(record.uid, record.name);
        Ok(())
    }

    /// Snapshot of all known identities, sorted by uid.
    pub fn all(&self) -> Vec<IdentityRecord> {
        let cache = self.cache.read().expect("identity cache poisoned");
        let mut records: Vec<IdentityRecord> = cache
            .iter()
            .map(|(uid, name)| IdentityRecord {
                uid: uid.clone(),
                name: name.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.uid.cmp(&b.uid));
        records
    }

    /// Number of cached identities.
    pub fn len(&self) -> usize {
        let cache = self.cache.read().expect("identity cache poisoned");
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_path(&self, uid: &str) -> PathBuf {
        self.users_dir.join(format!("{}.json", uid))
    }
}

fn read_record(path: &std::path::Path) -> Result<IdentityRecord> {
    let text = std::fs::read_to_string(path)?;
    let record: IdentityRecord = serde_json::from_str(&text)?;
    Ok(record)
}
