//! HTTP access to the FarmMate backend.

pub mod envelope;
pub mod farm_api_client;
pub mod retrying_fetch;

pub use farm_api_client::HttpFarmApi;
pub use retrying_fetch::{FetchBody, RetryingFetch};
