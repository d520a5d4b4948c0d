use crate::config::ScanConfig;
use crate::crawler::{FallbackCrawler, ProgressCallback};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::result::{DiscoveryResult, SitemapGroups};
use crate::robots::{SitemapLocator, fallback_sitemap_url};
use crate::sitemap::SitemapResolver;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

/// Finds the pages of a site: sitemaps first, a same-domain crawl when they yield nothing.
pub struct LinkDiscovery {
    config: ScanConfig,
    fetcher: Fetcher,
    progress_callback: Option<ProgressCallback>,
}

impl LinkDiscovery {
    pub fn new(config: ScanConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            progress_callback: None,
        })
    }

    /// Cancelling the token stops outstanding fetches; partial results are still returned.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.fetcher = self.fetcher.with_cancellation(token);
        self
    }

    /// Reports crawler progress. Sitemap resolution does not call it.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Discover with the configured page budget.
    pub async fn run(&self, homepage: &Url) -> DiscoveryResult {
        self.discover(homepage, self.config.max_pages).await
    }

    pub async fn discover(&self, homepage: &Url, max_pages: usize) -> DiscoveryResult {
        let mut candidates = SitemapLocator::new(self.fetcher.clone())
            .locate(homepage)
            .await;
        if candidates.is_empty()
            && let Some(fallback) = fallback_sitemap_url(homepage)
        {
            info!("No sitemap in robots.txt, trying {}", fallback);
            candidates.push(fallback);
        }

        let resolver = SitemapResolver::new(self.fetcher.clone(), self.config.max_sitemap_depth);
        let mut groups = SitemapGroups::new();
        for candidate in &candidates {
            resolver.resolve(candidate, &mut groups).await;
        }

        if groups.has_urls() {
            let result = DiscoveryResult::from_sitemaps(groups);
            info!(
                "Discovered {} URLs from {} sitemaps for {}",
                result.len(),
                result.grouped().map(|g| g.len()).unwrap_or(0),
                homepage
            );
            return result;
        }

        info!("No sitemap URLs for {}, falling back to crawling", homepage);
        let mut crawler =
            FallbackCrawler::new(self.fetcher.clone()).with_concurrency(self.config.concurrency);
        if let Some(ref callback) = self.progress_callback {
            crawler = crawler.with_progress_callback(callback.clone());
        }
        DiscoveryResult::from_crawl(crawler.crawl(homepage, max_pages).await)
    }
}
