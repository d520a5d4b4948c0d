use crate::fetch::Fetcher;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};
use url::Url;

/// Called with `(visited_count, url)` every time a page fetch is dispatched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Breadth-first crawler confined to the seed's host[:port].
///
/// Used when a site publishes no usable sitemap. The visited set and frontier live only for
/// the duration of one [`FallbackCrawler::crawl`] call.
pub struct FallbackCrawler {
    fetcher: Fetcher,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl FallbackCrawler {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            concurrency: 1,
            progress_callback: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Visit same-domain pages reachable from `seed`, returning them in visit order.
    ///
    /// Never fetches more than `max_pages` pages. Up to `concurrency` pages taken from the
    /// head of the frontier are fetched together; their links are enqueued in dispatch
    /// order, which yields the same visit order as a one-at-a-time crawl.
    pub async fn crawl(&self, seed: &Url, max_pages: usize) -> Vec<String> {
        let Some(base_domain) = network_location(seed) else {
            warn!("Seed URL has no host, nothing to crawl: {}", seed);
            return Vec::new();
        };
        let seed = normalize(seed.clone());

        info!(
            "Starting fallback crawl of {} (max {} pages, {} concurrent)",
            seed, max_pages, self.concurrency
        );

        let mut frontier: VecDeque<String> = VecDeque::from([seed.clone()]);
        let mut queued: HashSet<String> = HashSet::from([seed]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut order: Vec<String> = Vec::new();

        while !frontier.is_empty() && visited.len() < max_pages {
            if self.fetcher.is_cancelled() {
                warn!("Crawl cancelled after {} pages", visited.len());
                break;
            }

            let budget = (max_pages - visited.len()).min(self.concurrency);
            let mut batch = Vec::with_capacity(budget);
            while batch.len() < budget {
                let Some(url) = frontier.pop_front() else {
                    break;
                };
                if !visited.insert(url.clone()) {
                    continue;
                }
                order.push(url.clone());
                if let Some(ref callback) = self.progress_callback {
                    callback(visited.len(), url.clone());
                }
                batch.push(url);
            }

            let pages: Vec<Vec<String>> = stream::iter(batch)
                .map(|url| {
                    let base_domain = base_domain.as_str();
                    async move { self.visit(&url, base_domain).await }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

            for link in pages.into_iter().flatten() {
                if !visited.contains(&link) && queued.insert(link.clone()) {
                    frontier.push_back(link);
                }
            }
        }

        info!("Crawl complete. Visited {} pages", order.len());
        order
    }

    /// Fetch one page and return its same-domain links. Failures yield no links.
    async fn visit(&self, url: &str, base_domain: &str) -> Vec<String> {
        match self.fetcher.get(url).await {
            Ok(page) if page.is_html() => {
                let links = extract_same_domain_links(&page.body, url, base_domain);
                if links.is_empty() {
                    debug!("No links found on page: {}", url);
                }
                links
            }
            Ok(page) => {
                debug!(
                    "Not following links in {} ({})",
                    url,
                    page.content_type.as_deref().unwrap_or("unknown type")
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to load {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

/// host[:port] of a URL. The port only appears when it is not the scheme default.
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn normalize(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}

/// Absolute, fragment-free http(s) links in `html` whose host[:port] equals `base_domain`.
pub fn extract_same_domain_links(html: &str, page_url: &str, base_domain: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_url(&base, href) else {
            debug!("Skipping unusable link {:?} on {}", href, page_url);
            continue;
        };
        if network_location(&resolved).as_deref() == Some(base_domain) {
            links.push(normalize(resolved));
        } else {
            debug!("  -> Cross-domain, skipping {}", resolved);
        }
    }

    links
}

fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}
