//! Policy-driven retry over reqwest.
//!
//! Transient failures (transport errors and the policy's retryable statuses)
//! are retried with the policy's backoff. Everything else surfaces after the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use farmmate_core::config::RetryPolicy;
use farmmate_core::{FarmmateError, Result};
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::envelope;

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchBody {
    Json(Value),
    /// 204, or a 2xx with an empty body.
    NoContent,
}

impl FetchBody {
    /// Decodes the body as `T`, wrapped or bare. An empty body is a format error.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            FetchBody::Json(value) => envelope::decode(value),
            FetchBody::NoContent => Err(FarmmateError::data_format("response has no body")),
        }
    }
}

/// One failed attempt and the server's requested wait, if any.
struct AttemptFailure {
    error: FarmmateError,
    retry_after: Option<Duration>,
}

impl From<FarmmateError> for AttemptFailure {
    fn from(error: FarmmateError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

/// HTTP executor with bounded retry and optional cancellation.
#[derive(Clone)]
pub struct RetryingFetch {
    client: Client,
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
}

impl RetryingFetch {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            cancel: None,
        }
    }

    /// Aborts in-flight attempts and pending delays once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Same client and cancellation, different policy.
    pub fn with_policy(&self, policy: RetryPolicy) -> Self {
        Self {
            client: self.client.clone(),
            policy,
            cancel: self.cancel.clone(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends the request built by `build`, rebuilding it for every attempt.
    pub async fn send<F>(&self, build: F) -> Result<FetchBody>
    where
        F: Fn() -> RequestBuilder,
    {
        let attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            if self.is_cancelled() {
                return Err(FarmmateError::Cancelled);
            }

            let failure = match self.cancellable(self.attempt(build())).await? {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if !failure.error.is_retryable() {
                return Err(failure.error);
            }
            if attempt >= attempts {
                tracing::warn!(
                    attempts = attempt,
                    error = %failure.error,
                    "[RetryingFetch] Giving up"
                );
                return Err(FarmmateError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(failure.error),
                });
            }

            let delay = failure
                .retry_after
                .unwrap_or_else(|| self.policy.backoff.delay_for(attempt));
            tracing::warn!(
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure.error,
                "[RetryingFetch] Attempt failed, retrying"
            );
            self.cancellable(tokio::time::sleep(delay)).await?;
        }
    }

    /// Sends and decodes a JSON response.
    pub async fn json<T, F>(&self, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        self.send(build).await?.decode()
    }

    /// `GET url`, decoded as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T> {
        self.json(|| self.client.get(url.clone())).await
    }

    /// `method url` with a JSON body, decoded as `T`.
    pub async fn send_json<T, B>(&self, method: Method, url: reqwest::Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.json(|| self.client.request(method.clone(), url.clone()).json(body))
            .await
    }

    async fn attempt(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<FetchBody, AttemptFailure> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(FetchBody::NoContent);
            }
            let bytes = response.bytes().await.map_err(classify_transport)?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(FetchBody::NoContent);
            }
            return serde_json::from_slice(&bytes).map(FetchBody::Json).map_err(|e| {
                FarmmateError::data_format(format!("response is not JSON: {e}")).into()
            });
        }

        let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
        let body = response.text().await.unwrap_or_default();
        let retryable = self.policy.is_retryable_status(status.as_u16());

        Err(AttemptFailure {
            error: FarmmateError::http(status.as_u16(), envelope::error_message(&body), retryable),
            retry_after: retry_after.filter(|_| retryable),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn cancellable<T>(&self, future: impl Future<Output = T>) -> Result<T> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("[RetryingFetch] Cancelled");
                    Err(FarmmateError::Cancelled)
                }
                output = future => Ok(output),
            },
            None => Ok(future.await),
        }
    }
}

/// Transport failures are transient except for requests that could not be built.
fn classify_transport(err: reqwest::Error) -> AttemptFailure {
    if err.is_builder() {
        return FarmmateError::internal(format!("invalid request: {err}")).into();
    }
    FarmmateError::network(err.to_string()).into()
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are ignored; the policy's own delay applies then
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
