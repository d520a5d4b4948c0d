use clap::ArgMatches;
use colored::Colorize;
use sitescout_core::report::{ReportFormat, generate_report, save_report};
use sitescout_scanner::config::{
    DEFAULT_MAX_PAGES, DEFAULT_MAX_SITEMAP_DEPTH, DEFAULT_TIMEOUT_SECS,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

// Re-export discovery types and functions from sitescout-core
pub use sitescout_core::discover::{
    DiscoverOptions, DiscoverProgressCallback, SiteDiscovery, execute_discovery, extract_url_path,
};

// Helper functions for discover handler

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load homepages from either a hosts file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&str>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(&expand_path(hosts_file_path))
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse homepages from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as an http(s) URL, adding http:// to bare hosts
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
    {
        return Some(line.to_string());
    }

    if !line.contains("://") {
        let with_scheme = format!("http://{}", line);
        if Url::parse(&with_scheme).is_ok() {
            return Some(with_scheme);
        }
    }

    warn!("Skipping invalid URL '{}'", line);
    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling discovery");
            child.cancel();
        }
    });
    token
}

/// Run the discover command. Errors are messages for the user.
pub async fn run_discover(sub_matches: &ArgMatches, quiet: bool) -> Result<(), String> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<String>("hosts-file");
    let max_pages = *sub_matches
        .get_one::<usize>("max-pages")
        .unwrap_or(&DEFAULT_MAX_PAGES);
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&1);
    let timeout_secs = *sub_matches
        .get_one::<u64>("timeout")
        .unwrap_or(&DEFAULT_TIMEOUT_SECS);
    let max_sitemap_depth = *sub_matches
        .get_one::<usize>("max-sitemap-depth")
        .unwrap_or(&DEFAULT_MAX_SITEMAP_DEPTH);
    let output = sub_matches.get_one::<String>("output");
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let homepages = load_urls_from_source(url, hosts_file.map(String::as_str))?;

    if !quiet {
        println!(
            "\n{} Discovering {} site(s)",
            "→".blue().bold(),
            homepages.len().to_string().bright_white()
        );
        println!("Max pages: {}", max_pages);
        println!("Workers: {}", threads);
        println!("Timeout: {}s\n", timeout_secs);
    }

    let options = DiscoverOptions {
        homepages,
        max_pages,
        threads,
        timeout_secs,
        max_sitemap_depth,
        show_progress_bars: !quiet,
        cancel: cancel_on_ctrl_c(),
    };

    let progress_callback: Option<DiscoverProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{}", msg);
        }))
    };

    let sites = execute_discovery(options, progress_callback)
        .await
        .map_err(|e| format!("Discovery failed: {}", e))?;

    if !quiet {
        println!("\n{} Discovery complete!\n", "✓".green().bold());
    }

    // reports written to disk carry no ANSI colours
    if output.is_some() {
        colored::control::set_override(false);
    }
    let report = generate_report(&sites, format)
        .map_err(|e| format!("Failed to render report: {}", e))?;

    match output {
        Some(path) => {
            let path = expand_path(path);
            save_report(&report, &path)
                .map_err(|e| format!("Failed to write report to {}: {}", path.display(), e))?;
            colored::control::unset_override();
            if !quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}

pub async fn handle_discover(sub_matches: &ArgMatches, quiet: bool) {
    if let Err(e) = run_discover(sub_matches, quiet).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
