//! Local persistence for the FarmMate client: file locations, the cached
//! client state and the configuration file.

pub mod config_service;
pub mod local_cache;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::local_cache::{CacheDocument, LocalCache};
pub use crate::paths::FarmmatePaths;
