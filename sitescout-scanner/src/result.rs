use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Leaf URLs grouped by the urlset sitemap they were read from.
///
/// Keeps insertion order. Recording a sitemap twice replaces its URLs but keeps the
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl SitemapGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sitemap_url: &str, urls: Vec<String>) {
        match self.groups.iter_mut().find(|(key, _)| key == sitemap_url) {
            Some((_, existing)) => *existing = urls,
            None => self.groups.push((sitemap_url.to_string(), urls)),
        }
    }

    pub fn get(&self, sitemap_url: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(key, _)| key == sitemap_url)
            .map(|(_, urls)| urls.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(key, urls)| (key.as_str(), urls.as_slice()))
    }

    /// Number of recorded sitemaps, including ones that listed no URLs.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when at least one sitemap contributed a leaf URL.
    pub fn has_urls(&self) -> bool {
        self.groups.iter().any(|(_, urls)| !urls.is_empty())
    }

    /// All leaf URLs, sitemap by sitemap, in recorded order.
    pub fn flatten(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|(_, urls)| urls.iter().cloned())
            .collect()
    }
}

impl Serialize for SitemapGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, urls) in &self.groups {
            map.serialize_entry(key, urls)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Sitemap,
    Crawler,
}

impl DiscoverySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverySource::Sitemap => "sitemap",
            DiscoverySource::Crawler => "crawler",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one discovery run.
///
/// An empty URL list is a legitimate result: every source was tried and none answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DiscoveryResult {
    Sitemap {
        grouped: SitemapGroups,
        urls: Vec<String>,
    },
    Crawler {
        urls: Vec<String>,
    },
}

impl DiscoveryResult {
    pub fn from_sitemaps(grouped: SitemapGroups) -> Self {
        let urls = grouped.flatten();
        DiscoveryResult::Sitemap { grouped, urls }
    }

    pub fn from_crawl(urls: Vec<String>) -> Self {
        DiscoveryResult::Crawler { urls }
    }

    pub fn source(&self) -> DiscoverySource {
        match self {
            DiscoveryResult::Sitemap { .. } => DiscoverySource::Sitemap,
            DiscoveryResult::Crawler { .. } => DiscoverySource::Crawler,
        }
    }

    pub fn urls(&self) -> &[String] {
        match self {
            DiscoveryResult::Sitemap { urls, .. } | DiscoveryResult::Crawler { urls } => urls,
        }
    }

    pub fn grouped(&self) -> Option<&SitemapGroups> {
        match self {
            DiscoveryResult::Sitemap { grouped, .. } => Some(grouped),
            DiscoveryResult::Crawler { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.urls().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls().is_empty()
    }

    /// The page-selection list: discovered URLs with the homepage first when it is missing.
    pub fn audit_candidates(&self, homepage: &str) -> Vec<String> {
        let mut candidates = self.urls().to_vec();
        if !candidates.iter().any(|u| u == homepage) {
            candidates.insert(0, homepage.to_string());
        }
        candidates
    }
}
