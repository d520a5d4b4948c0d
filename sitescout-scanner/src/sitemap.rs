//! Sitemap parsing and recursive sitemap-index expansion.
//!
//! Only documents in the sitemap protocol namespace
//! (`http://www.sitemaps.org/schemas/sitemap/0.9`) are understood. Elements are matched by
//! local name inside that namespace, so a `<urlset>` without the namespace declaration is
//! reported as unrecognized rather than read.

use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::result::SitemapGroups;
use futures::future::BoxFuture;
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// A parsed sitemap document, classified by its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEntry {
    /// `<sitemapindex>`: child sitemap URLs, not yet fetched.
    Index(Vec<String>),
    /// `<urlset>`: leaf page URLs.
    UrlSet(Vec<String>),
    /// Any other root element (or a root outside the sitemap namespace).
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
}

impl RootKind {
    /// Element wrapping each `<loc>` we care about.
    fn entry_element(self) -> &'static str {
        match self {
            RootKind::Index => "sitemap",
            RootKind::UrlSet => "url",
        }
    }

    fn into_entry(self, locs: Vec<String>) -> SitemapEntry {
        match self {
            RootKind::Index => SitemapEntry::Index(locs),
            RootKind::UrlSet => SitemapEntry::UrlSet(locs),
        }
    }
}

fn in_sitemap_namespace(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE.as_bytes())
}

/// Parse a sitemap or sitemap index.
///
/// Every `<url>` (or `<sitemap>`) contributes the trimmed text of its first non-empty
/// `<loc>` child. Malformed XML is an error; callers treat it like a failed fetch.
pub fn parse_sitemap(xml: &str) -> Result<SitemapEntry> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<RootKind> = None;
    // number of currently open elements, root included
    let mut depth = 0usize;
    let mut locs = Vec::new();

    let mut entry_depth: Option<usize> = None;
    let mut entry_has_loc = false;
    let mut loc_depth: Option<usize> = None;
    let mut loc_text = String::new();

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_ns = in_sitemap_namespace(&ns);
        let self_closing = matches!(event, Event::Empty(_));

        match event {
            Event::Start(e) | Event::Empty(e) if root.is_none() => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let kind = match name.as_str() {
                    "sitemapindex" if in_ns => RootKind::Index,
                    "urlset" if in_ns => RootKind::UrlSet,
                    _ => return Ok(SitemapEntry::Unrecognized(name)),
                };
                if self_closing {
                    return Ok(kind.into_entry(Vec::new()));
                }
                root = Some(kind);
                depth = 1;
            }
            Event::Start(e) => {
                let local = e.local_name();
                let name = local.as_ref();
                let parent_is_entry = entry_depth == Some(depth);
                let is_entry =
                    in_ns && root.is_some_and(|kind| name == kind.entry_element().as_bytes());
                let is_loc = in_ns && name == b"loc" && parent_is_entry && !entry_has_loc;
                depth += 1;

                if is_entry {
                    entry_depth = Some(depth);
                    entry_has_loc = false;
                } else if is_loc {
                    loc_depth = Some(depth);
                    loc_text.clear();
                }
            }
            Event::End(_) => {
                if loc_depth == Some(depth) {
                    let loc = loc_text.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                        entry_has_loc = true;
                    }
                    loc_depth = None;
                } else if entry_depth == Some(depth) {
                    entry_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if loc_depth == Some(depth) => {
                loc_text.push_str(&e.unescape()?);
            }
            Event::CData(e) if loc_depth == Some(depth) => {
                loc_text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match root {
        Some(_) if depth > 0 => Err(ScanError::ParseError(
            "unexpected end of sitemap document".to_string(),
        )),
        Some(kind) => Ok(kind.into_entry(locs)),
        None => Err(ScanError::ParseError(
            "sitemap document has no root element".to_string(),
        )),
    }
}

/// Fetches sitemaps and expands sitemap indexes into [`SitemapGroups`].
#[derive(Clone)]
pub struct SitemapResolver {
    fetcher: Fetcher,
    max_depth: usize,
}

impl SitemapResolver {
    pub fn new(fetcher: Fetcher, max_depth: usize) -> Self {
        Self { fetcher, max_depth }
    }

    /// Resolve `sitemap_url` into `groups`.
    ///
    /// Failures of any single sitemap (fetch, status, parse) only drop that branch.
    pub async fn resolve(&self, sitemap_url: &str, groups: &mut SitemapGroups) {
        let mut in_progress = HashSet::new();
        self.resolve_node(sitemap_url.to_string(), 0, &mut in_progress, groups)
            .await;
    }

    fn resolve_node<'a>(
        &'a self,
        url: String,
        depth: usize,
        in_progress: &'a mut HashSet<String>,
        groups: &'a mut SitemapGroups,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            // in_progress holds the ancestors of this node
            if !in_progress.insert(url.clone()) {
                warn!("Sitemap cycle detected, skipping {}", url);
                return;
            }
            self.expand(&url, depth, in_progress, groups).await;
            in_progress.remove(&url);
        })
    }

    async fn expand(
        &self,
        url: &str,
        depth: usize,
        in_progress: &mut HashSet<String>,
        groups: &mut SitemapGroups,
    ) {
        let page = match self.fetcher.get(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch sitemap {}: {}", url, e);
                return;
            }
        };

        match parse_sitemap(&page.body) {
            Ok(SitemapEntry::Index(children)) => {
                info!("Sitemap index: {} ({} children)", url, children.len());
                if depth >= self.max_depth {
                    warn!(
                        "Sitemap index {} exceeds max expansion depth {}, not expanding",
                        url, self.max_depth
                    );
                    return;
                }
                for child in children {
                    if self.fetcher.is_cancelled() {
                        break;
                    }
                    self.resolve_node(child, depth + 1, in_progress, groups)
                        .await;
                }
            }
            Ok(SitemapEntry::UrlSet(urls)) => {
                info!("Reading sitemap: {} ({} URLs)", url, urls.len());
                groups.record(url, urls);
            }
            Ok(SitemapEntry::Unrecognized(root)) => {
                debug!("Ignoring {}: root element <{}> is not a sitemap", url, root);
            }
            Err(e) => {
                warn!("Error parsing {}: {}", url, e);
            }
        }
    }
}
