use crate::Result;
use chrono::{DateTime, Utc};
use query_analyzer_config::ApiKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sidecar written next to every cached schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub api: ApiKind,
    pub version: String,
    pub fetched_at: DateTime<Utc>,
}

/// One cached schema, as listed by [`SchemaStore::info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub api: String,
    pub version: String,
    pub path: PathBuf,
    /// Size of the schema JSON in bytes
    pub size: u64,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Raw introspection JSON on disk, laid out as
/// `<root>/<api>/<version>.json` plus `<root>/<api>/<version>.meta.json`.
///
/// Entries never expire; refreshing is the caller's decision.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    root: PathBuf,
}

impl SchemaStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn schema_path(&self, api: ApiKind, version: &str) -> PathBuf {
        self.root.join(api.as_str()).join(format!("{version}.json"))
    }

    #[must_use]
    pub fn meta_path(&self, api: ApiKind, version: &str) -> PathBuf {
        self.root
            .join(api.as_str())
            .join(format!("{version}.meta.json"))
    }

    /// Cached bytes, or `None` unless both the schema and its metadata exist.
    pub fn load(&self, api: ApiKind, version: &str) -> Result<Option<Vec<u8>>> {
        let schema_path = self.schema_path(api, version);
        if !schema_path.is_file() || self.metadata(api, version).is_none() {
            return Ok(None);
        }
        Ok(Some(fs::read(schema_path)?))
    }

    /// Metadata for an entry, `None` when missing or unreadable.
    #[must_use]
    pub fn metadata(&self, api: ApiKind, version: &str) -> Option<CacheMetadata> {
        let path = self.meta_path(api, version);
        let contents = fs::read(&path).ok()?;
        match serde_json::from_slice(&contents) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt cache metadata");
                None
            }
        }
    }

    /// Write schema bytes and fresh metadata.
    pub fn save(&self, api: ApiKind, version: &str, bytes: &[u8]) -> Result<CacheMetadata> {
        let schema_path = self.schema_path(api, version);
        if let Some(parent) = schema_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&schema_path, bytes)?;

        let meta = CacheMetadata {
            api,
            version: version.to_string(),
            fetched_at: Utc::now(),
        };
        let meta_json =
            serde_json::to_vec_pretty(&meta).map_err(|e| crate::CacheError::Io(e.to_string()))?;
        fs::write(self.meta_path(api, version), meta_json)?;

        tracing::debug!(path = %schema_path.display(), size = bytes.len(), "Stored schema");
        Ok(meta)
    }

    /// All cached schemas, sorted by api then version.
    pub fn info(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        if !self.root.is_dir() {
            return Ok(entries);
        }

        for api_dir in fs::read_dir(&self.root)? {
            let api_dir = api_dir?;
            if !api_dir.file_type()?.is_dir() {
                continue;
            }
            let api = api_dir.file_name().to_string_lossy().into_owned();

            for file in fs::read_dir(api_dir.path())? {
                let file = file?;
                let name = file.file_name().to_string_lossy().into_owned();
                if name.ends_with(".meta.json") {
                    continue;
                }
                let Some(version) = name.strip_suffix(".json") else {
                    continue;
                };
                let fetched_at = api
                    .parse::<ApiKind>()
                    .ok()
                    .and_then(|kind| self.metadata(kind, version))
                    .map(|meta| meta.fetched_at);
                entries.push(CacheEntry {
                    api: api.clone(),
                    version: version.to_string(),
                    path: file.path(),
                    size: file.metadata()?.len(),
                    fetched_at,
                });
            }
        }

        entries.sort_by(|a, b| (&a.api, &a.version).cmp(&(&b.api, &b.version)));
        Ok(entries)
    }

    /// Remove every cached schema. Returns false when there was nothing to remove.
    pub fn clear(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.root)?;
        tracing::info!(path = %self.root.display(), "Cleared schema cache");
        Ok(true)
    }
}
