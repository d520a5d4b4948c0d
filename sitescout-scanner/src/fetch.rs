use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A successfully fetched (HTTP 200) response body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    /// True when the server did not label the body as something other than HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
            .unwrap_or(true)
    }
}

/// Shared HTTP client used by the locator, resolver and crawler.
///
/// Cloning is cheap; every clone shares the connection pool and the cancellation token.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(16)
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// GET `url` and return the body. Anything but a 200 is an error.
    pub async fn get(&self, url: &str) -> Result<FetchedPage> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled(url.to_string()));
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(ScanError::Cancelled(url.to_string())),
            page = self.get_inner(url) => page,
        }
    }

    async fn get_inner(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedPage {
            url: url.to_string(),
            content_type,
            body,
        })
    }
}
