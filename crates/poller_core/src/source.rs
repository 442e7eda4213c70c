use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::PollError;

/// Where the poller gets its payload text from.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_text(&self) -> Result<String, PollError>;
}

/// Plain `GET` against a fixed URL; no headers, no query.
pub struct HttpDataSource {
    http: Client,
    url: Url,
    timeout: Duration,
}

impl HttpDataSource {
    pub fn new(server_url: &str, path: &str, timeout: Duration) -> Result<Self, PollError> {
        let url = Url::parse(server_url)
            .and_then(|base| base.join(path))
            .map_err(|source| PollError::InvalidUrl {
                url: format!("{server_url}{path}"),
                source,
            })?;
        Ok(Self {
            http: Client::new(),
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_text(&self) -> Result<String, PollError> {
        let response = self
            .http
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status {
                status,
                url: self.url.to_string(),
            });
        }

        let text = response.text().await?;
        debug!(url = %self.url, bytes = text.len(), "fetched data payload");
        Ok(text)
    }
}
