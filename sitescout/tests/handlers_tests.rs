use sitescout::handlers::*;
use std::io::Write;
use tempfile::NamedTempFile;
use url::Url;

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_host_with_port() {
    let result = parse_url_line("localhost:8080");
    assert_eq!(result, Some("http://localhost:8080".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    assert_eq!(parse_url_line("not a valid url!!!"), None);
    assert_eq!(parse_url_line("ftp://files.example.com"), None);
}

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("https://example.com/blog/post"), "/blog/post");
    assert_eq!(extract_url_path("https://example.com/"), "/");
    assert_eq!(extract_url_path("https://example.com"), "/");
}

#[test]
fn test_load_urls_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "httpbin.org")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "  https://docs.example.com  ")?;

    let urls = load_urls_from_file(temp_file.path())?;

    assert_eq!(
        urls,
        vec![
            "https://example.com",
            "http://httpbin.org",
            "https://docs.example.com"
        ]
    );

    Ok(())
}

#[test]
fn test_load_urls_from_file_skips_invalid_lines() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "not a valid url!!!")?;
    writeln!(temp_file, "example.org")?;

    let urls = load_urls_from_file(temp_file.path())?;
    assert_eq!(urls, vec!["http://example.org"]);
    Ok(())
}

#[test]
fn test_load_urls_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let result = load_urls_from_file(temp_file.path());

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_urls_from_missing_file() {
    let result = load_urls_from_file(std::path::Path::new("/nonexistent/sitescout/hosts.txt"));
    assert!(result.unwrap_err().contains("Failed to read hosts file"));
}

#[test]
fn test_load_urls_from_source_single_url() {
    let url = Url::parse("https://example.com").unwrap();
    let result = load_urls_from_source(Some(&url), None).unwrap();

    assert_eq!(result, vec!["https://example.com/"]);
}

#[test]
fn test_load_urls_from_source_hosts_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "example.com")?;
    let path = temp_file.path().to_string_lossy().to_string();

    let result = load_urls_from_source(None, Some(path.as_str()))?;
    assert_eq!(result, vec!["http://example.com"]);
    Ok(())
}

#[test]
fn test_load_urls_from_source_no_input() {
    let result = load_urls_from_source(None, None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either --url or --hosts-file must be provided")
    );
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/reports/out.json");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("reports/out.json"));

    assert_eq!(expand_path("/tmp/out.json"), std::path::PathBuf::from("/tmp/out.json"));
}
