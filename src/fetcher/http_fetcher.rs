use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::app::{ClonerError, Result};
use crate::fetcher::Fetcher;

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("clonernews/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base: normalize_base(base_url)?,
        })
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn normalize_base(base_url: &str) -> Result<Url> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{}/", base_url))?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClonerError::NotFound(path.to_string()));
        }

        response.error_for_status_ref()?;

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}
