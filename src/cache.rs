//! File hash cache (C6): per-check per-file content hashes persisted as a
//! single JSON document, so unchanged work can be skipped across runs.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;
use sha2::{Digest, Sha256};

/// `{ plugins: { <check-name>: { <relative-file-path>: <content-hash> } } }`
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct CacheDocument {
    #[serde(default)]
    plugins: BTreeMap<String, BTreeMap<String, String>>,
}

/// The cache for a single tool name, e.g. `<repo>/.cache/hex-validate.json`.
pub struct FileHashCache {
    path: PathBuf,
    document: CacheDocument,
}

impl FileHashCache {
    /// Reads lazily on first use. Read failures (missing file, malformed
    /// JSON) degrade to an empty cache with a `warn!` log line, never a
    /// fatal error.
    pub fn load(cache_dir: &Path, tool_name: &str) -> Self {
        let path = cache_dir.join(format!("{tool_name}.json"));
        let document = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("cache file {} is malformed ({err}), starting empty", path.display());
                CacheDocument::default()
            }),
            Err(_) => CacheDocument::default(),
        };
        Self { path, document }
    }

    /// Stored hash for `check_name`'s partition of `file`, if any.
    pub fn get(&self, check_name: &str, file: &str) -> Option<&str> {
        self.document
            .plugins
            .get(check_name)
            .and_then(|files| files.get(file))
            .map(String::as_str)
    }

    /// Returns true if the file's current content hash differs from (or is
    /// absent from) the check's cache partition.
    pub fn is_stale(&self, check_name: &str, file: &str, current_hash: &str) -> bool {
        self.get(check_name, file) != Some(current_hash)
    }

    /// Overwrites `check_name`'s entire cache partition. Re-reads the
    /// on-disk document first so a check running after another in the same
    /// stage never clobbers a sibling partition it doesn't own.
    pub fn update_partition(&mut self, check_name: &str, hashes: BTreeMap<String, String>) {
        self.reload();
        self.document.plugins.insert(check_name.to_string(), hashes);
    }

    fn reload(&mut self) {
        if let Ok(contents) = std::fs::read_to_string(&self.path) {
            if let Ok(doc) = serde_json::from_str(&contents) {
                self.document = doc;
            }
        }
    }

    /// Writes through a temporary file in the same directory followed by an
    /// atomic rename. Write failures degrade with a `warn!` log line.
    pub fn save(&self) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        if std::fs::create_dir_all(dir).is_err() {
            warn!("could not create cache directory {}", dir.display());
            return;
        }
        let contents = match serde_json::to_string_pretty(&self.document) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("failed to serialize cache ({err})");
                return;
            }
        };
        match tempfile::NamedTempFile::new_in(dir) {
            Ok(mut tmp) => {
                if let Err(err) = tmp.write_all(contents.as_bytes()) {
                    warn!("failed to write cache ({err})");
                    return;
                }
                if let Err(err) = tmp.persist(&self.path) {
                    warn!("failed to rename cache into place ({err})");
                }
            }
            Err(err) => warn!("failed to create temp file for cache ({err})"),
        }
    }
}

/// A collision-resistant content hash of raw file bytes, hex-encoded.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}
