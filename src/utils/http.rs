// src/utils/http.rs

//! HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::Result;
use crate::models::HttpConfig;

/// A fetched response, after redirects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedResource {
    /// URL the last redirect landed on
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Empty for HEAD requests
    pub body: Vec<u8>,
}

impl FetchedResource {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Network seam for everything that reads from the web.
///
/// Transport failures are errors; an HTTP error status is not, callers
/// inspect [`FetchedResource::status`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedResource>;

    async fn head(&self, url: &str, timeout: Duration) -> Result<FetchedResource>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// [`Fetcher`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(
        &self,
        request: reqwest::RequestBuilder,
        read_body: bool,
    ) -> Result<FetchedResource> {
        let response = request.send().await?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = if read_body {
            response.bytes().await?.to_vec()
        } else {
            Vec::new()
        };

        Ok(FetchedResource {
            final_url,
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedResource> {
        self.fetch(self.client.get(url).timeout(timeout), true).await
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<FetchedResource> {
        self.fetch(self.client.head(url).timeout(timeout), false)
            .await
    }
}
