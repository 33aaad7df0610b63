use crate::errors::PublishError;
use crate::metrics_defs::PUBLISH_ATTEMPTS;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

#[derive(Clone, Debug, PartialEq)]
pub struct UploadResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends one upload attempt.
#[async_trait]
pub trait Uploader: Send + Sync {
    fn destination(&self) -> &Url;

    async fn upload(&self, body: Bytes) -> Result<UploadResponse, PublishError>;
}

/// POSTs the raw bytes to a fixed URL.
pub struct HttpUploader {
    client: reqwest::Client,
    url: Url,
}

impl HttpUploader {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpUploader { client, url })
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    fn destination(&self) -> &Url {
        &self.url
    }

    async fn upload(&self, body: Bytes) -> Result<UploadResponse, PublishError> {
        let response = self.client.post(self.url.clone()).body(body).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(UploadResponse { status, body })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Published {
    pub url: Url,
    pub attempts: u32,
}

/// Uploads with bounded retries. Only `201 Created` counts as success; after
/// failed attempt `n` (from 0) it waits `backoff_base * 2^n`, except after the
/// last attempt. Transport errors are returned without retrying.
pub struct Publisher {
    uploader: Arc<dyn Uploader>,
    max_attempts: u32,
    backoff_base: Duration,
}

impl Publisher {
    pub fn new(uploader: Arc<dyn Uploader>, max_attempts: u32, backoff_base: Duration) -> Self {
        Publisher {
            uploader,
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn destination(&self) -> &Url {
        self.uploader.destination()
    }

    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub async fn publish(&self, csv: Bytes) -> Result<Published, PublishError> {
        let mut attempt = 0;

        loop {
            let response = self.uploader.upload(csv.clone()).await?;
            shared::counter!(PUBLISH_ATTEMPTS, "status" => response.status.as_str().to_string())
                .increment(1);
            attempt += 1;

            if response.status == StatusCode::CREATED {
                tracing::info!(url = %self.destination(), attempts = attempt, "Report uploaded");
                return Ok(Published {
                    url: self.destination().clone(),
                    attempts: attempt,
                });
            }

            tracing::warn!(
                url = %self.destination(),
                attempt,
                status = %response.status,
                "Upload rejected"
            );

            if attempt >= self.max_attempts {
                return Err(PublishError::Exhausted {
                    attempts: attempt,
                    status: response.status,
                    body: response.body,
                });
            }

            sleep(self.backoff_delay(attempt - 1)).await;
        }
    }
}
