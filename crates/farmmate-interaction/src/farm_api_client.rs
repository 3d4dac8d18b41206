//! `FarmApi` over HTTP.

use async_trait::async_trait;
use farmmate_core::api::{CreateThreadRequest, FarmApi, ModifyThreadRequest, ThreadCreated};
use farmmate_core::bookmark::{Bookmark, BookmarkCreated, NewBookmark};
use farmmate_core::chat::{OutgoingMessage, SentReply, ThreadHistory};
use farmmate_core::config::{ClientConfig, RetryPolicy};
use farmmate_core::crop::{CropSummary, MemberCreated, ThreadListing};
use farmmate_core::guidance::Guidance;
use farmmate_core::pest::{PestAlerts, PestDetail};
use farmmate_core::weather::{CurrentWeather, DayForecast};
use farmmate_core::{FarmmateError, Result};
use reqwest::{Client, Method, Url};
use tokio_util::sync::CancellationToken;

use crate::envelope;
use crate::retrying_fetch::{FetchBody, RetryingFetch};

/// The FarmMate backend REST API.
#[derive(Clone)]
pub struct HttpFarmApi {
    base_url: Url,
    fetch: RetryingFetch,
    history_policy: RetryPolicy,
}

impl HttpFarmApi {
    /// Builds a client from the configuration (base URL, timeout, retry policy).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FarmmateError::config(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(config.normalized_base_url())
            .map_err(|e| FarmmateError::config(format!("invalid base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FarmmateError::config(format!(
                "base_url cannot be a base: {base_url}"
            )));
        }

        let history_policy = config
            .retry
            .clone()
            .with_max_attempts(RetryPolicy::message_history().max_attempts);

        Ok(Self {
            base_url,
            fetch: RetryingFetch::new(client, config.retry.clone()),
            history_policy,
        })
    }

    /// Ties every request to `token` (the lifetime of the view issuing it).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.fetch = self.fetch.with_cancellation(token);
        self
    }

    /// `base_url` plus percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn url_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.url(segments);
        url.query_pairs_mut().extend_pairs(query);
        url
    }

    fn thread_url(&self, member_id: &str, thread_id: &str, rest: &[&str]) -> Url {
        let mut segments = vec!["members", member_id, "threads", thread_id];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    /// Sends a request whose success carries no payload we need.
    async fn execute(&self, method: Method, url: Url) -> Result<()> {
        self.fetch
            .send(|| self.fetch.client().request(method.clone(), url.clone()))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl FarmApi for HttpFarmApi {
    async fn create_member(&self) -> Result<String> {
        let created: MemberCreated = self
            .fetch
            .json(|| self.fetch.client().post(self.url(&["members"])))
            .await?;
        tracing::info!(member_id = %created.member_id, "[HttpFarmApi] Member created");
        Ok(created.member_id)
    }

    async fn list_crops(&self) -> Result<Vec<CropSummary>> {
        self.fetch.get_json(self.url(&["crops"])).await
    }

    async fn list_threads(&self, member_id: &str) -> Result<ThreadListing> {
        self.fetch
            .get_json(self.url(&["members", member_id, "threads"]))
            .await
    }

    async fn create_thread(
        &self,
        member_id: &str,
        request: &CreateThreadRequest,
    ) -> Result<ThreadCreated> {
        self.fetch
            .send_json(
                Method::POST,
                self.url(&["members", member_id, "threads"]),
                request,
            )
            .await
    }

    async fn modify_thread(
        &self,
        member_id: &str,
        thread_id: &str,
        request: &ModifyThreadRequest,
    ) -> Result<ThreadCreated> {
        let url = self.thread_url(member_id, thread_id, &[]);
        let body = self
            .fetch
            .send(|| self.fetch.client().patch(url.clone()).json(request))
            .await?;
        match body {
            FetchBody::NoContent => Ok(ThreadCreated::default()),
            FetchBody::Json(value) => envelope::decode_or_default(value),
        }
    }

    async fn delete_thread(&self, member_id: &str, thread_id: &str) -> Result<()> {
        self.execute(Method::DELETE, self.thread_url(member_id, thread_id, &[]))
            .await
    }

    async fn get_thread_history(
        &self,
        member_id: &str,
        thread_id: &str,
    ) -> Result<ThreadHistory> {
        self.fetch
            .with_policy(self.history_policy.clone())
            .get_json(self.thread_url(member_id, thread_id, &[]))
            .await
    }

    async fn send_message(
        &self,
        member_id: &str,
        thread_id: &str,
        message: &str,
    ) -> Result<SentReply> {
        let body = OutgoingMessage {
            message: message.to_string(),
        };
        self.fetch
            .send_json(
                Method::POST,
                self.thread_url(member_id, thread_id, &["messages"]),
                &body,
            )
            .await
    }

    async fn list_bookmarks(&self, member_id: &str, thread_id: &str) -> Result<Vec<Bookmark>> {
        self.fetch
            .get_json(self.thread_url(member_id, thread_id, &["bookmarks"]))
            .await
    }

    async fn create_bookmark(
        &self,
        member_id: &str,
        thread_id: &str,
        bookmark: &NewBookmark,
    ) -> Result<String> {
        let created: BookmarkCreated = self
            .fetch
            .send_json(
                Method::POST,
                self.thread_url(member_id, thread_id, &["bookmarks"]),
                bookmark,
            )
            .await?;
        created
            .bookmark_id
            .ok_or_else(|| FarmmateError::data_format("bookmark response carries no bookmarkId"))
    }

    async fn delete_bookmark(
        &self,
        member_id: &str,
        thread_id: &str,
        bookmark_id: &str,
    ) -> Result<()> {
        self.execute(
            Method::DELETE,
            self.thread_url(member_id, thread_id, &["bookmarks", bookmark_id]),
        )
        .await
    }

    async fn current_weather(&self, address: &str) -> Result<CurrentWeather> {
        self.fetch
            .get_json(self.url_with_query(&["weather", "current"], &[("address", address)]))
            .await
    }

    async fn short_term_forecast(&self, address: &str) -> Result<Vec<DayForecast>> {
        self.fetch
            .get_json(self.url_with_query(&["weather", "short-term"], &[("address", address)]))
            .await
    }

    async fn pest_alerts(&self, crop_name: &str) -> Result<PestAlerts> {
        self.fetch
            .get_json(self.url_with_query(&["pests"], &[("cropName", crop_name)]))
            .await
    }

    async fn pest_detail(&self, pest_name: &str, crop_name: &str) -> Result<PestDetail> {
        self.fetch
            .get_json(self.url_with_query(&["pests", pest_name], &[("cropName", crop_name)]))
            .await
    }

    async fn guidance(&self, member_id: &str, thread_id: &str, crop_id: i64) -> Result<Guidance> {
        let crop_id = crop_id.to_string();
        let mut url = self.thread_url(member_id, thread_id, &["status"]);
        url.query_pairs_mut().append_pair("cropId", &crop_id);
        self.fetch.get_json(url).await
    }
}
