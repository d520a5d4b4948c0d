use std::time::Duration;

/// Per-request timeout applied to robots.txt, sitemap and page fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Page budget for the fallback crawler.
pub const DEFAULT_MAX_PAGES: usize = 5000;

/// How many nested sitemap indexes are expanded below a candidate sitemap.
pub const DEFAULT_MAX_SITEMAP_DEPTH: usize = 8;

/// Settings shared by every stage of a discovery run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_pages: usize,
    pub max_sitemap_depth: usize,
    /// Number of crawler fetches dispatched together. 1 keeps the crawl strictly sequential.
    pub concurrency: usize,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!(
                "Sitescout/{} (https://github.com/trapdoorsec/sitescout)",
                env!("CARGO_PKG_VERSION")
            ),
            max_pages: DEFAULT_MAX_PAGES,
            max_sitemap_depth: DEFAULT_MAX_SITEMAP_DEPTH,
            concurrency: 1,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_sitemap_depth(mut self, depth: usize) -> Self {
        self.max_sitemap_depth = depth;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}
