//! Crop catalog and thread linkage.

pub mod model;

pub use model::{CropCatalog, CropEntry, CropSummary, CropTile, MemberCreated, ThreadListing};
