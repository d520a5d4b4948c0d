use colored::Colorize;

pub mod discover;
pub mod report;

pub use discover::{
    DiscoverOptions, DiscoverProgressCallback, SiteDiscovery, execute_discovery, extract_url_path,
};
pub use report::{ReportFormat, save_report};

const BANNER: &str = r#"
      _ _                            _
  ___(_) |_ ___  ___  ___ ___  _   _| |_
 / __| | __/ _ \/ __|/ __/ _ \| | | | __|
 \__ \ | ||  __/\__ \ (_| (_) | |_| | |_
 |___/_|\__\___||___/\___\___/ \__,_|\__|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "every reachable page, sitemap first".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
