// Report generation from discovery results

use crate::discover::SiteDiscovery;
use colored::Colorize;
use serde::Serialize;
use sitescout_scanner::DiscoveryResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
        }
    }
}

/// Render `sites` in the requested format.
pub fn generate_report(
    sites: &[SiteDiscovery],
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(sites)),
        ReportFormat::Json => generate_json_report(sites),
        ReportFormat::Markdown => Ok(generate_markdown_report(sites)),
    }
}

pub fn generate_text_report(sites: &[SiteDiscovery]) -> String {
    let mut report = String::new();

    report.push_str(&format!("{}\n", RULE.bright_blue()));
    report.push_str(&format!(
        "{}\n",
        "                        SITESCOUT DISCOVERY REPORT".bright_white().bold()
    ));
    report.push_str(&format!("{}\n\n", RULE.bright_blue()));

    for site in sites {
        report.push_str(&format!("{}   {}\n", "Homepage:".bold(), site.homepage.bright_white()));
        report.push_str(&format!("{}     {}\n", "Source:".bold(), source_label(&site.result)));
        report.push_str(&format!("{}       {:.2}s\n", "Time:".bold(), site.elapsed_secs()));
        report.push_str(&format!(
            "{} {}\n\n",
            "URLs found:".bold(),
            site.result.len().to_string().cyan()
        ));

        match site.result.grouped() {
            Some(grouped) => {
                for (sitemap, urls) in grouped.iter() {
                    report.push_str(&format!(
                        "  {} {}\n",
                        sitemap.bright_blue(),
                        format!("({} URLs)", urls.len()).dimmed()
                    ));
                    for url in urls {
                        report.push_str(&format!("    {}\n", url));
                    }
                    report.push('\n');
                }
            }
            None if site.result.is_empty() => {
                report.push_str(&format!("  {}\n\n", "(no pages reachable)".yellow()));
            }
            None => {
                for url in site.result.urls() {
                    report.push_str(&format!("  {}\n", url));
                }
                report.push('\n');
            }
        }

        report.push_str("────────────────────────────────────────────────────────────────────────────────\n\n");
    }

    let total_urls: usize = sites.iter().map(|s| s.result.len()).sum();
    report.push_str(&format!("{}\n", RULE.bright_blue()));
    report.push_str(&format!(
        "Sites: {}   Total URLs: {}\n",
        sites.len(),
        total_urls.to_string().cyan()
    ));
    report.push_str(&format!("{}\n", RULE.bright_blue()));

    report
}

fn source_label(result: &DiscoveryResult) -> String {
    match result.grouped() {
        Some(grouped) => format!("{} ({} sitemaps)", result.source(), grouped.len())
            .green()
            .to_string(),
        None => format!("{} (no usable sitemap)", result.source())
            .yellow()
            .to_string(),
    }
}

#[derive(Serialize)]
struct SiteEntry<'a> {
    homepage: &'a str,
    elapsed_seconds: f64,
    url_count: usize,
    #[serde(flatten)]
    result: &'a DiscoveryResult,
}

pub fn generate_json_report(sites: &[SiteDiscovery]) -> Result<String, serde_json::Error> {
    let entries: Vec<SiteEntry<'_>> = sites
        .iter()
        .map(|site| SiteEntry {
            homepage: &site.homepage,
            elapsed_seconds: site.elapsed_secs(),
            url_count: site.result.len(),
            result: &site.result,
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Sitescout",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "total_sites": sites.len(),
                "total_urls": sites.iter().map(|s| s.result.len()).sum::<usize>()
            },
            "sites": entries
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(sites: &[SiteDiscovery]) -> String {
    let mut report = String::new();
    report.push_str("# Sitescout Discovery Report\n\n");
    report.push_str(&format!(
        "_Generated {}_\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    report.push_str("| Homepage | Source | URLs | Time |\n");
    report.push_str("|----------|--------|------|------|\n");
    for site in sites {
        report.push_str(&format!(
            "| {} | {} | {} | {:.2}s |\n",
            site.homepage,
            site.result.source(),
            site.result.len(),
            site.elapsed_secs()
        ));
    }
    report.push('\n');

    for site in sites {
        report.push_str(&format!("## {}\n\n", site.homepage));
        match site.result.grouped() {
            Some(grouped) => {
                for (sitemap, urls) in grouped.iter() {
                    report.push_str(&format!("### `{}`\n\n", sitemap));
                    push_url_list(&mut report, urls);
                }
            }
            None => push_url_list(&mut report, site.result.urls()),
        }
    }

    report
}

fn push_url_list(report: &mut String, urls: &[String]) {
    if urls.is_empty() {
        report.push_str("_No URLs._\n\n");
        return;
    }
    for url in urls {
        report.push_str(&format!("- <{}>\n", url));
    }
    report.push('\n');
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
