//! Domain model of the FarmMate client: crops and their threads, chat
//! messages, bookmarks, weather, pests and guidance, plus the [`FarmApi`]
//! seam the application services talk to.

pub mod api;
pub mod bookmark;
pub mod chat;
pub mod config;
pub mod crop;
pub mod error;
pub mod guidance;
pub mod pest;
pub mod serde_util;
pub mod weather;

pub use api::FarmApi;
pub use error::{FarmmateError, Result};
