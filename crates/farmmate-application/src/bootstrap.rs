//! Splash-screen bootstrap: member registration and crop catalog seeding.

use std::sync::Arc;

use farmmate_core::{FarmApi, Result};
use farmmate_infrastructure::LocalCache;
use serde::Serialize;

/// Page shown after bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    /// At least one crop is being grown.
    CropList,
    /// Nothing grown yet; show the crop recommendation page.
    Recommend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    pub member_id: String,
    pub landing: Landing,
}

#[derive(Clone)]
pub struct Bootstrap {
    api: Arc<dyn FarmApi>,
    cache: Arc<LocalCache>,
}

impl Bootstrap {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self { api, cache }
    }

    /// Ensures a member id and a crop catalog exist, then picks the landing page.
    ///
    /// Failing to register the member is an error. A failed crop fetch only
    /// logs; the landing is computed from whatever is cached.
    pub async fn run(&self) -> Result<BootstrapOutcome> {
        let member_id = self.ensure_member().await?;

        if self.cache.crop_catalog()?.is_empty() {
            match self.api.list_crops().await {
                Ok(crops) => {
                    let added = self
                        .cache
                        .update(|doc| Ok(doc.crops_data.merge_available(&crops)))?;
                    tracing::info!(added, "[Bootstrap] Crop catalog seeded");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "[Bootstrap] Could not fetch available crops");
                }
            }
        }

        let landing = if self.cache.crop_catalog()?.has_created() {
            Landing::CropList
        } else {
            Landing::Recommend
        };
        tracing::debug!(member_id = %member_id, ?landing, "[Bootstrap] Done");

        Ok(BootstrapOutcome { member_id, landing })
    }

    async fn ensure_member(&self) -> Result<String> {
        if let Some(member_id) = self.cache.member_id()? {
            return Ok(member_id);
        }

        let created = self.api.create_member().await?;
        // Another writer may have registered meanwhile; the first id wins.
        let member_id = self
            .cache
            .update(|doc| Ok(doc.member_id.get_or_insert(created).clone()))?;
        tracing::info!(member_id = %member_id, "[Bootstrap] Member registered");
        Ok(member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFarmApi, empty_cache, seeded_cache};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_first_run_registers_and_seeds() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(MockFarmApi::new());
        let cache = empty_cache(&temp_dir);
        let bootstrap = Bootstrap::new(api.clone(), cache.clone());

        let outcome = bootstrap.run().await.unwrap();

        assert_eq!(
            outcome,
            BootstrapOutcome {
                member_id: "M1".into(),
                landing: Landing::Recommend,
            }
        );
        assert_eq!(cache.member_id().unwrap().as_deref(), Some("M1"));
        let catalog = cache.crop_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        let potato = catalog.get("감자").unwrap();
        assert_eq!(potato.crop_id, 1);
        assert!(!potato.created);
        assert_eq!(potato.thread_id, "");
        assert_eq!(potato.address, "");
    }

    #[tokio::test]
    async fn test_second_run_uses_cache() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(MockFarmApi::new());
        let bootstrap = Bootstrap::new(api.clone(), seeded_cache(&temp_dir));

        let outcome = bootstrap.run().await.unwrap();

        assert_eq!(outcome.landing, Landing::CropList);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_member_failure_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(MockFarmApi::new());
        api.fail("create_member");
        let cache = empty_cache(&temp_dir);
        let bootstrap = Bootstrap::new(api.clone(), cache.clone());

        assert!(bootstrap.run().await.is_err());
        assert_eq!(cache.member_id().unwrap(), None);
        assert_eq!(api.calls("list_crops"), 0);
    }

    #[tokio::test]
    async fn test_crop_failure_still_lands() {
        let temp_dir = TempDir::new().unwrap();
        let api = Arc::new(MockFarmApi::new());
        api.fail("list_crops");
        let cache = empty_cache(&temp_dir);
        let bootstrap = Bootstrap::new(api.clone(), cache.clone());

        let outcome = bootstrap.run().await.unwrap();
        assert_eq!(outcome.landing, Landing::Recommend);
        assert!(cache.crop_catalog().unwrap().is_empty());
        assert_eq!(cache.member_id().unwrap().as_deref(), Some("M1"));
    }
}
