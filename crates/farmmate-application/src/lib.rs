//! Application layer for FarmMate.
//!
//! Use cases that coordinate the backend API with the local cache: the
//! splash bootstrap, crop thread lifecycle, chat and bookmark sync, and the
//! dashboard widgets.

pub mod bookmark_sync;
pub mod bootstrap;
pub mod chat_sync;
pub mod crop_lifecycle;
pub mod dashboard;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use farmmate_core::FarmApi;
use farmmate_infrastructure::LocalCache;

pub use bookmark_sync::BookmarkSync;
pub use bootstrap::{Bootstrap, BootstrapOutcome, Landing};
pub use chat_sync::ChatSync;
pub use crop_lifecycle::CropLifecycle;
pub use dashboard::DashboardService;

/// Every service wired to one API client and one cache.
#[derive(Clone)]
pub struct FarmmateServices {
    pub bootstrap: Bootstrap,
    pub crops: CropLifecycle,
    pub chat: ChatSync,
    pub bookmarks: BookmarkSync,
    pub dashboard: DashboardService,
}

impl FarmmateServices {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self {
            bootstrap: Bootstrap::new(api.clone(), cache.clone()),
            crops: CropLifecycle::new(api.clone(), cache.clone()),
            chat: ChatSync::new(api.clone(), cache.clone()),
            bookmarks: BookmarkSync::new(api.clone(), cache.clone()),
            dashboard: DashboardService::new(api, cache),
        }
    }
}
