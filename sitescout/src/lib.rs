// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{expand_path, load_urls_from_file, load_urls_from_source, parse_url_line};

// Re-export discovery functionality from sitescout-core
pub use sitescout_core::discover::{
    DiscoverOptions, DiscoverProgressCallback, SiteDiscovery, execute_discovery, extract_url_path,
};
