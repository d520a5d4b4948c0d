use indicatif::{ProgressBar, ProgressStyle};
use sitescout_scanner::config::{
    DEFAULT_MAX_PAGES, DEFAULT_MAX_SITEMAP_DEPTH, DEFAULT_TIMEOUT_SECS,
};
use sitescout_scanner::{DiscoveryResult, LinkDiscovery, ProgressCallback, ScanConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Options for a discovery run over one or more homepages
pub struct DiscoverOptions {
    pub homepages: Vec<String>,
    pub max_pages: usize,
    /// Concurrent page fetches during a fallback crawl
    pub threads: usize,
    pub timeout_secs: u64,
    pub max_sitemap_depth: usize,
    pub show_progress_bars: bool,
    pub cancel: CancellationToken,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            homepages: Vec::new(),
            max_pages: DEFAULT_MAX_PAGES,
            threads: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_sitemap_depth: DEFAULT_MAX_SITEMAP_DEPTH,
            show_progress_bars: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// Callback for reporting per-site progress messages
pub type DiscoverProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Discovery outcome for a single homepage
#[derive(Debug, Clone)]
pub struct SiteDiscovery {
    pub homepage: String,
    pub elapsed: Duration,
    pub result: DiscoveryResult,
}

impl SiteDiscovery {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Pages offered for selection: discovered URLs, homepage first.
    pub fn audit_candidates(&self) -> Vec<String> {
        self.result.audit_candidates(&self.homepage)
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

fn normalize_homepage(homepage: &str) -> Option<Url> {
    let mut url = Url::parse(homepage.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting discovery...");
    pb
}

/// Run discovery for every homepage in `options`, one site after another.
///
/// Homepages that are not absolute http(s) URLs are reported through `progress_callback`
/// and skipped. Only a failure to build the HTTP client is returned as an error.
pub async fn execute_discovery(
    options: DiscoverOptions,
    progress_callback: Option<DiscoverProgressCallback>,
) -> Result<Vec<SiteDiscovery>, String> {
    let DiscoverOptions {
        homepages,
        max_pages,
        threads,
        timeout_secs,
        max_sitemap_depth,
        show_progress_bars,
        cancel,
    } = options;

    let config = ScanConfig::new()
        .with_timeout(timeout_secs)
        .with_max_pages(max_pages)
        .with_max_sitemap_depth(max_sitemap_depth)
        .with_concurrency(threads);

    let progress_bar = show_progress_bars.then(|| Arc::new(spinner()));

    let mut discovery = LinkDiscovery::new(config)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?
        .with_cancellation(cancel.clone());

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let crawl_progress: ProgressCallback = Arc::new(move |count: usize, url: String| {
            pb_clone.set_message(format!(
                "Crawling... {} pages visited ({})",
                count,
                extract_url_path(&url)
            ));
        });
        discovery = discovery.with_progress_callback(crawl_progress);
    }

    let report = |msg: String| {
        if let Some(ref callback) = progress_callback {
            match progress_bar {
                Some(ref pb) => pb.suspend(|| callback(msg)),
                None => callback(msg),
            }
        }
    };

    let mut sites = Vec::new();
    for (idx, raw) in homepages.iter().enumerate() {
        if cancel.is_cancelled() {
            report(format!(
                "[!]  Discovery cancelled, {} site(s) not processed",
                homepages.len() - idx
            ));
            break;
        }

        let Some(homepage) = normalize_homepage(raw) else {
            report(format!("[!]  Skipping invalid homepage '{}'", raw));
            continue;
        };

        if homepages.len() > 1 {
            report(format!(
                "Discovering site {}/{}: {}",
                idx + 1,
                homepages.len(),
                homepage
            ));
        }
        if let Some(ref pb) = progress_bar {
            pb.set_message(format!("Looking for sitemaps on {}", homepage));
        }

        let started = Instant::now();
        let result = discovery.discover(&homepage, max_pages).await;
        let elapsed = started.elapsed();

        report(format!(
            "Found {} URLs on {} via {} in {:.2}s",
            result.len(),
            homepage,
            result.source(),
            elapsed.as_secs_f64()
        ));

        sites.push(SiteDiscovery {
            homepage: homepage.to_string(),
            elapsed,
            result,
        });
    }

    if let Some(ref pb) = progress_bar {
        let total: usize = sites.iter().map(|s| s.result.len()).sum();
        pb.finish_with_message(format!("Discovery complete! {} URLs found", total));
    }

    Ok(sites)
}
