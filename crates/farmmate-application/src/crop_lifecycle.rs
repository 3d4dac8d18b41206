//! Crop thread lifecycle: create, modify, delete and sync with the backend.
//!
//! Every successful backend change is written to the local crop catalog in a
//! single cache update. A failed call leaves the cache untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use farmmate_core::api::{CreateThreadRequest, ModifyThreadRequest};
use farmmate_core::crop::{CropEntry, CropTile};
use farmmate_core::{FarmApi, FarmmateError, Result};
use farmmate_infrastructure::LocalCache;

#[derive(Clone)]
pub struct CropLifecycle {
    api: Arc<dyn FarmApi>,
    cache: Arc<LocalCache>,
}

/// Checks a planting date is `YYYY-MM-DD` and returns it normalized.
fn parse_planted_at(planted_at: &str) -> Result<String> {
    let planted_at = planted_at.trim();
    NaiveDate::parse_from_str(planted_at, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| {
            FarmmateError::user_input(format!(
                "planting date must be YYYY-MM-DD, got '{planted_at}'"
            ))
        })
}

fn require_address(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(FarmmateError::user_input("address is empty"));
    }
    Ok(address.to_string())
}

impl CropLifecycle {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self { api, cache }
    }

    /// Starts growing `crop_name`: creates its thread and selects the crop.
    pub async fn create(
        &self,
        member_id: &str,
        crop_name: &str,
        address: &str,
        planted_at: &str,
    ) -> Result<CropEntry> {
        let entry = self.cache.crop_catalog()?.require(crop_name)?.clone();
        if entry.created {
            return Err(FarmmateError::user_input(format!(
                "{crop_name} already has a thread; modify it instead"
            )));
        }
        let address = require_address(address)?;
        let planted_at = parse_planted_at(planted_at)?;

        let request = CreateThreadRequest {
            address: address.clone(),
            crop_id: entry.crop_id,
            crop_name: crop_name.to_string(),
            planted_at: planted_at.clone(),
        };
        let created = self.api.create_thread(member_id, &request).await?;
        let thread_id = created
            .thread_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FarmmateError::data_format("thread response carries no threadId"))?;

        let entry = self.cache.update(|doc| {
            let entry = doc.crops_data.require_mut(crop_name)?;
            entry.attach_thread(thread_id);
            entry.address = address;
            entry.planted_at = Some(planted_at);
            let entry = entry.clone();
            doc.select_crop = Some(crop_name.to_string());
            Ok(entry)
        })?;

        tracing::info!(
            crop = crop_name,
            thread_id = %entry.thread_id,
            "[CropLifecycle] Crop thread created"
        );
        Ok(entry)
    }

    /// Changes the address and planting date of a created crop.
    pub async fn modify(
        &self,
        member_id: &str,
        crop_name: &str,
        address: &str,
        planted_at: &str,
    ) -> Result<CropEntry> {
        let catalog = self.cache.crop_catalog()?;
        let thread_id = catalog.require_thread(crop_name)?;
        let crop_id = catalog.require(crop_name)?.crop_id;
        let address = require_address(address)?;
        let planted_at = parse_planted_at(planted_at)?;

        let request = ModifyThreadRequest {
            crop_id,
            address: address.clone(),
            planted_at: planted_at.clone(),
        };
        let modified = self
            .api
            .modify_thread(member_id, &thread_id, &request)
            .await?;

        let entry = self.cache.update(|doc| {
            let entry = doc.crops_data.require_mut(crop_name)?;
            if let Some(new_id) = modified.thread_id.filter(|id| !id.is_empty()) {
                entry.attach_thread(new_id);
            }
            entry.address = address;
            entry.planted_at = Some(planted_at);
            Ok(entry.clone())
        })?;

        tracing::info!(crop = crop_name, "[CropLifecycle] Crop thread modified");
        Ok(entry)
    }

    /// Deletes the crop's thread and detaches it in the catalog.
    pub async fn delete(&self, member_id: &str, crop_name: &str) -> Result<()> {
        let thread_id = self.cache.crop_catalog()?.require_thread(crop_name)?;
        self.api.delete_thread(member_id, &thread_id).await?;

        self.cache.update(|doc| {
            doc.crops_data.require_mut(crop_name)?.detach_thread();
            if doc.select_crop.as_deref() == Some(crop_name) {
                doc.select_crop = None;
            }
            Ok(())
        })?;

        tracing::info!(
            crop = crop_name,
            thread_id = %thread_id,
            "[CropLifecycle] Crop thread deleted"
        );
        Ok(())
    }

    /// Aligns the catalog with the member's threads on the backend and
    /// returns the crop list tiles.
    pub async fn sync_with_server(&self, member_id: &str) -> Result<Vec<CropTile>> {
        let listing = self.api.list_threads(member_id).await?;
        self.cache.update(|doc| {
            let changed = doc.crops_data.reconcile_with(&listing);
            if !changed.is_empty() {
                tracing::info!(crops = ?changed, "[CropLifecycle] Catalog reconciled with server");
            }
            Ok(doc.crops_data.tiles())
        })
    }

    /// Tiles from the cached catalog, without asking the backend.
    pub fn tiles(&self) -> Result<Vec<CropTile>> {
        Ok(self.cache.crop_catalog()?.tiles())
    }

    /// Persists `crop_name` as the selected crop.
    pub fn select(&self, crop_name: &str) -> Result<()> {
        self.cache.update(|doc| {
            doc.crops_data.require(crop_name)?;
            doc.select_crop = Some(crop_name.to_string());
            Ok(())
        })
    }
}
