use crate::fetch::Fetcher;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

// Keyword is case-sensitive; commented-out lines do not match because of the anchor.
static SITEMAP_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*Sitemap:[ \t]*([^\s#][^\r\n]*)").expect("static regex is valid")
});

/// Finds candidate sitemap URLs for a site from its robots.txt.
#[derive(Clone)]
pub struct SitemapLocator {
    fetcher: Fetcher,
}

impl SitemapLocator {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Returns the sitemap URLs announced in `<origin>/robots.txt`, in file order.
    ///
    /// An empty result means "try the conventional location"; it is never an error.
    pub async fn locate(&self, homepage: &Url) -> Vec<String> {
        let Some(robots_url) = robots_url(homepage) else {
            warn!("Cannot derive robots.txt location from {}", homepage);
            return Vec::new();
        };

        match self.fetcher.get(robots_url.as_str()).await {
            Ok(page) => {
                info!("Found robots.txt: {}", robots_url);
                let sitemaps = parse_sitemap_directives(&page.body, &robots_url);
                for sitemap in &sitemaps {
                    info!("Found sitemap in robots.txt: {}", sitemap);
                }
                sitemaps
            }
            Err(e) => {
                debug!("No usable robots.txt at {}: {}", robots_url, e);
                Vec::new()
            }
        }
    }
}

pub fn robots_url(homepage: &Url) -> Option<Url> {
    homepage.join("/robots.txt").ok()
}

/// The conventional sitemap location used when robots.txt announces nothing.
pub fn fallback_sitemap_url(homepage: &Url) -> Option<String> {
    homepage.join("/sitemap.xml").ok().map(|u| u.to_string())
}

/// Extracts `Sitemap:` directives, resolving relative values against `robots_url`.
pub fn parse_sitemap_directives(body: &str, robots_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sitemaps = Vec::new();

    for caps in SITEMAP_DIRECTIVE.captures_iter(body) {
        let raw = caps[1].trim();
        match robots_url.join(raw) {
            Ok(resolved) => {
                let resolved = resolved.to_string();
                if seen.insert(resolved.clone()) {
                    sitemaps.push(resolved);
                }
            }
            Err(e) => warn!("Skipping unusable sitemap directive '{}': {}", raw, e),
        }
    }

    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn robots() -> Url {
        Url::parse("https://example.com/robots.txt").unwrap()
    }

    #[test]
    fn test_parses_directives_in_file_order() {
        let body = "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/a.xml\n\
                    Sitemap:   https://example.com/b.xml   \r\n";
        let sitemaps = parse_sitemap_directives(body, &robots());
        assert_eq!(
            sitemaps,
            vec!["https://example.com/a.xml", "https://example.com/b.xml"]
        );
    }

    #[test]
    fn test_keyword_is_case_sensitive() {
        let body = "sitemap: https://example.com/lower.xml\nSITEMAP: https://example.com/upper.xml\n";
        assert!(parse_sitemap_directives(body, &robots()).is_empty());
    }

    #[test]
    fn test_relative_directive_is_resolved() {
        let body = "Sitemap: /sitemaps/main.xml\n";
        assert_eq!(
            parse_sitemap_directives(body, &robots()),
            vec!["https://example.com/sitemaps/main.xml"]
        );
    }

    #[test]
    fn test_duplicates_and_comments_are_dropped() {
        let body = "# Sitemap: https://example.com/old.xml\n\
                    Sitemap: https://example.com/s.xml\n\
                    Sitemap: https://example.com/s.xml\n";
        assert_eq!(
            parse_sitemap_directives(body, &robots()),
            vec!["https://example.com/s.xml"]
        );
    }

    #[test]
    fn test_fallback_location_uses_origin() {
        let homepage = Url::parse("https://example.com/blog/post?x=1").unwrap();
        assert_eq!(
            fallback_sitemap_url(&homepage).as_deref(),
            Some("https://example.com/sitemap.xml")
        );
    }

    #[tokio::test]
    async fn test_locate_reads_robots() {
        let mock_server = MockServer::start().await;
        let body = format!("Sitemap: {}/sitemap_index.xml\n", mock_server.uri());
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let locator = SitemapLocator::new(Fetcher::new(&ScanConfig::default()).unwrap());
        let homepage = Url::parse(&format!("{}/about/", mock_server.uri())).unwrap();
        let sitemaps = locator.locate(&homepage).await;

        assert_eq!(
            sitemaps,
            vec![format!("{}/sitemap_index.xml", mock_server.uri())]
        );
    }

    #[tokio::test]
    async fn test_locate_missing_robots_is_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let locator = SitemapLocator::new(Fetcher::new(&ScanConfig::default()).unwrap());
        let homepage = Url::parse(&mock_server.uri()).unwrap();

        assert!(locator.locate(&homepage).await.is_empty());
    }
}
