pub mod config;
pub mod crawler;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod result;
pub mod robots;
pub mod sitemap;

pub use config::ScanConfig;
pub use crawler::{FallbackCrawler, ProgressCallback};
pub use discovery::LinkDiscovery;
pub use error::ScanError;
pub use fetch::Fetcher;
pub use result::{DiscoveryResult, DiscoverySource, SitemapGroups};
pub use robots::SitemapLocator;
pub use sitemap::{SitemapEntry, SitemapResolver};
