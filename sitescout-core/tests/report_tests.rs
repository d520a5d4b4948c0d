// Tests for report generation functionality

use sitescout_core::discover::SiteDiscovery;
use sitescout_core::report::{
    ReportFormat, generate_json_report, generate_markdown_report, generate_report,
    generate_text_report, save_report,
};
use sitescout_scanner::{DiscoveryResult, SitemapGroups};
use std::time::Duration;
use tempfile::TempDir;

fn sitemap_site() -> SiteDiscovery {
    let mut grouped = SitemapGroups::new();
    grouped.record(
        "https://example.com/sitemap-posts.xml",
        vec![
            "https://example.com/posts/1".to_string(),
            "https://example.com/posts/2".to_string(),
        ],
    );
    grouped.record(
        "https://example.com/sitemap-pages.xml",
        vec!["https://example.com/about".to_string()],
    );
    SiteDiscovery {
        homepage: "https://example.com/".to_string(),
        elapsed: Duration::from_millis(1500),
        result: DiscoveryResult::from_sitemaps(grouped),
    }
}

fn crawled_site() -> SiteDiscovery {
    SiteDiscovery {
        homepage: "https://small.example.org/".to_string(),
        elapsed: Duration::from_millis(250),
        result: DiscoveryResult::from_crawl(vec![
            "https://small.example.org/".to_string(),
            "https://small.example.org/contact".to_string(),
        ]),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("MD"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("csv"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Report Content Tests
// ============================================================================

#[test]
fn test_text_report_lists_groups_and_timing() {
    colored::control::set_override(false);
    let report = generate_text_report(&[sitemap_site(), crawled_site()]);

    assert!(report.contains("Homepage:   https://example.com/"));
    assert!(report.contains("sitemap (2 sitemaps)"));
    assert!(report.contains("https://example.com/sitemap-posts.xml (2 URLs)"));
    assert!(report.contains("    https://example.com/posts/2"));
    assert!(report.contains("Time:       1.50s"));
    assert!(report.contains("crawler (no usable sitemap)"));
    assert!(report.contains("Total URLs: 5"));
}

#[test]
fn test_text_report_empty_site() {
    colored::control::set_override(false);
    let site = SiteDiscovery {
        homepage: "https://down.example.com/".to_string(),
        elapsed: Duration::from_secs(1),
        result: DiscoveryResult::from_crawl(Vec::new()),
    };
    let report = generate_text_report(&[site]);
    assert!(report.contains("(no pages reachable)"));
}

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&[sitemap_site(), crawled_site()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let report = &value["report"];

    assert_eq!(report["metadata"]["generator"], "Sitescout");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["summary"]["total_sites"], 2);
    assert_eq!(report["summary"]["total_urls"], 5);

    let first = &report["sites"][0];
    assert_eq!(first["homepage"], "https://example.com/");
    assert_eq!(first["source"], "sitemap");
    assert_eq!(first["url_count"], 3);
    assert_eq!(first["elapsed_seconds"], 1.5);
    assert_eq!(
        first["grouped"]["https://example.com/sitemap-pages.xml"][0],
        "https://example.com/about"
    );
    assert_eq!(first["urls"][2], "https://example.com/about");

    let second = &report["sites"][1];
    assert_eq!(second["source"], "crawler");
    assert!(second.get("grouped").is_none());
}

#[test]
fn test_markdown_report() {
    let report = generate_markdown_report(&[sitemap_site(), crawled_site()]);

    assert!(report.starts_with("# Sitescout Discovery Report"));
    assert!(report.contains("| https://example.com/ | sitemap | 3 | 1.50s |"));
    assert!(report.contains("### `https://example.com/sitemap-posts.xml`"));
    assert!(report.contains("- <https://small.example.org/contact>"));
}

#[test]
fn test_generate_report_dispatches_on_format() {
    let sites = [crawled_site()];
    let json = generate_report(&sites, ReportFormat::Json).unwrap();
    assert!(json.trim_start().starts_with('{'));

    let markdown = generate_report(&sites, ReportFormat::Markdown).unwrap();
    assert!(markdown.starts_with('#'));
}

#[test]
fn test_save_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("final_site_urls.json");

    let json = generate_json_report(&[crawled_site()])?;
    save_report(&json, &path)?;

    let written = std::fs::read_to_string(&path)?;
    assert_eq!(written, json);
    Ok(())
}
