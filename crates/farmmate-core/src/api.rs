//! The backend API as seen by the application services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bookmark::{Bookmark, NewBookmark};
use crate::chat::{SentReply, ThreadHistory};
use crate::crop::{CropSummary, ThreadListing};
use crate::error::Result;
use crate::guidance::Guidance;
use crate::pest::{PestAlerts, PestDetail};
use crate::weather::{CurrentWeather, DayForecast};

/// Body of `POST /members/{id}/threads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub address: String,
    pub crop_id: i64,
    pub crop_name: String,
    /// `YYYY-MM-DD`
    pub planted_at: String,
}

/// Body of `PATCH /members/{id}/threads/{threadId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyThreadRequest {
    pub crop_id: i64,
    pub address: String,
    pub planted_at: String,
}

/// Response of thread create/modify. Modify may answer with no body at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCreated {
    #[serde(default, deserialize_with = "crate::serde_util::optional_id_string")]
    pub thread_id: Option<String>,
}

/// Every backend call the client makes.
///
/// Implementations own transport concerns (retry, timeouts, cancellation);
/// callers only see domain values or a [`crate::FarmmateError`].
#[async_trait]
pub trait FarmApi: Send + Sync {
    /// `POST /members`; returns the new member id.
    async fn create_member(&self) -> Result<String>;

    /// `GET /crops`
    async fn list_crops(&self) -> Result<Vec<CropSummary>>;

    /// `GET /members/{id}/threads`
    async fn list_threads(&self, member_id: &str) -> Result<ThreadListing>;

    async fn create_thread(
        &self,
        member_id: &str,
        request: &CreateThreadRequest,
    ) -> Result<ThreadCreated>;

    async fn modify_thread(
        &self,
        member_id: &str,
        thread_id: &str,
        request: &ModifyThreadRequest,
    ) -> Result<ThreadCreated>;

    async fn delete_thread(&self, member_id: &str, thread_id: &str) -> Result<()>;

    /// `GET /members/{id}/threads/{threadId}`, retried with the history policy.
    async fn get_thread_history(&self, member_id: &str, thread_id: &str)
    -> Result<ThreadHistory>;

    async fn send_message(
        &self,
        member_id: &str,
        thread_id: &str,
        message: &str,
    ) -> Result<SentReply>;

    async fn list_bookmarks(&self, member_id: &str, thread_id: &str) -> Result<Vec<Bookmark>>;

    /// Returns the id of the created bookmark.
    async fn create_bookmark(
        &self,
        member_id: &str,
        thread_id: &str,
        bookmark: &NewBookmark,
    ) -> Result<String>;

    async fn delete_bookmark(
        &self,
        member_id: &str,
        thread_id: &str,
        bookmark_id: &str,
    ) -> Result<()>;

    async fn current_weather(&self, address: &str) -> Result<CurrentWeather>;

    async fn short_term_forecast(&self, address: &str) -> Result<Vec<DayForecast>>;

    async fn pest_alerts(&self, crop_name: &str) -> Result<PestAlerts>;

    async fn pest_detail(&self, pest_name: &str, crop_name: &str) -> Result<PestDetail>;

    async fn guidance(&self, member_id: &str, thread_id: &str, crop_id: i64) -> Result<Guidance>;
}
