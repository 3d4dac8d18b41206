//! Persistent client state: member id, crop catalog and selected crop.

use std::path::PathBuf;
use std::sync::Mutex;

use farmmate_core::crop::{CropCatalog, CropEntry};
use farmmate_core::{FarmmateError, Result};
use serde::{Deserialize, Serialize};

use crate::storage::AtomicJsonFile;

/// The persisted document. Key names match the browser local storage the
/// web client used, so a dump of one can be dropped in as the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(rename = "memberId", default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(rename = "crops_data", default)]
    pub crops_data: CropCatalog,
    #[serde(rename = "select_crop", default, skip_serializing_if = "Option::is_none")]
    pub select_crop: Option<String>,
    /// Bumped on every write.
    #[serde(default)]
    pub version: u64,
}

impl CacheDocument {
    /// Repairs crop entries whose `created` flag disagrees with `threadId`.
    fn repair(&mut self) -> Vec<String> {
        let repaired = self.crops_data.repair();
        if !repaired.is_empty() {
            tracing::warn!(
                crops = ?repaired,
                "[LocalCache] Repaired crop entries with inconsistent thread linkage"
            );
        }
        repaired
    }
}

/// Cached client state with a single serialized writer.
///
/// Every write takes the in-process writer lock, then the file lock, re-reads
/// the document from disk, applies the mutation, bumps `version` and replaces
/// the file atomically. Concurrent tasks therefore never overwrite each
/// other's changes. Processes on different machines sharing one file are not
/// merged.
pub struct LocalCache {
    file: AtomicJsonFile<CacheDocument>,
    writer: Mutex<()>,
}

impl LocalCache {
    /// Opens the cache at `path`, persisting any invariant repair right away.
    pub fn open(path: PathBuf) -> Result<Self> {
        let cache = Self {
            file: AtomicJsonFile::new(path),
            writer: Mutex::new(()),
        };

        let needs_repair = cache
            .file
            .load()?
            .is_some_and(|doc| doc.crops_data.iter().any(|(_, e)| !e.is_consistent()));
        if needs_repair {
            cache.update(|_| Ok(()))?;
        }

        tracing::debug!(path = %cache.file.path().display(), "[LocalCache] Opened");
        Ok(cache)
    }

    /// The current document, repaired in memory if needed.
    pub fn snapshot(&self) -> Result<CacheDocument> {
        let mut doc = self.file.load()?.unwrap_or_default();
        doc.repair();
        Ok(doc)
    }

    pub fn version(&self) -> Result<u64> {
        Ok(self.snapshot()?.version)
    }

    pub fn member_id(&self) -> Result<Option<String>> {
        Ok(self.snapshot()?.member_id)
    }

    pub fn crop_catalog(&self) -> Result<CropCatalog> {
        Ok(self.snapshot()?.crops_data)
    }

    pub fn crop(&self, crop_name: &str) -> Result<Option<CropEntry>> {
        Ok(self.snapshot()?.crops_data.get(crop_name).cloned())
    }

    pub fn selected_crop(&self) -> Result<Option<String>> {
        Ok(self.snapshot()?.select_crop)
    }

    pub fn set_member_id(&self, member_id: impl Into<String>) -> Result<()> {
        let member_id = member_id.into();
        self.update(move |doc| {
            doc.member_id = Some(member_id);
            Ok(())
        })
    }

    pub fn set_crop_catalog(&self, catalog: CropCatalog) -> Result<()> {
        self.update(move |doc| {
            doc.crops_data = catalog;
            Ok(())
        })
    }

    pub fn set_selected_crop(&self, crop_name: impl Into<String>) -> Result<()> {
        let crop_name = crop_name.into();
        self.update(move |doc| {
            doc.select_crop = Some(crop_name);
            Ok(())
        })
    }

    /// Applies `f` to the freshest document through the serialized writer.
    ///
    /// Nothing is written when `f` fails.
    pub fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut CacheDocument) -> Result<R>,
    {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        let _writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.file.update(CacheDocument::default(), |doc| {
            doc.repair();
            let outcome = f(doc)?;
            doc.version += 1;
            tracing::trace!(version = doc.version, "[LocalCache] Writing document");
            Ok::<R, FarmmateError>(outcome)
        })
    }

    /// Removes every key. The version keeps counting.
    pub fn clear(&self) -> Result<()> {
        self.update(|doc| {
            let version = doc.version;
            *doc = CacheDocument {
                version,
                ..CacheDocument::default()
            };
            Ok(())
        })?;
        tracing::info!("[LocalCache] Cleared");
        Ok(())
    }
}
