use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitescout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitescout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("discover")
                .about(
                    "Discover every reachable page of one or more sites. Uses the sites' XML \
                sitemaps and falls back to a same-domain crawl.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The homepage to discover")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of homepages")
                        .conflicts_with("url"),
                )
                .group(
                    clap::ArgGroup::new("target")
                        .args(["url", "hosts-file"])
                        .required(true),
                )
                .arg(
                    arg!(--"max-pages" <NUM>)
                        .required(false)
                        .help("Maximum number of pages the fallback crawler may fetch per site")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5000"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Concurrent page fetches during a fallback crawl")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"max-sitemap-depth" <DEPTH>)
                        .required(false)
                        .help("How many levels of nested sitemap indexes to follow")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("8"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                ),
        )
}
