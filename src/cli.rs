// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Args, Parser, Subcommand};
use link_sentinel::CrawlOptions;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-sentinel",
    version,
    about = "Crawl a website and stream broken links as they're found",
    long_about = "link-sentinel crawls a website breadth-first, checks every link it finds \
                  (internal and external), and reports broken ones live. \
                  Press Ctrl-C to stop early and still get the partial report."
)]
pub struct Cli {
    // The #[command(subcommand)] attribute tells clap that this field
    // will hold one of the subcommands defined in the Commands enum
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and report broken links
    ///
    /// Example: link-sentinel check https://example.com --max-depth 2
    Check(CheckArgs),

    /// Read start/stop commands as JSON lines on stdin, write events to stdout
    ///
    /// Every output line carries "session": which startCrawl produced it,
    /// counting from 1 (0 for rejected commands). A replaced session still
    /// sends its own "finished", possibly after the new session's first events.
    ///
    /// Example input: {"type": "startCrawl", "url": "https://example.com"}
    Serve,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Website URL to start from (e.g., https://example.com)
    pub website_url: String,

    /// Print every event as a JSON line instead of human-readable output
    #[arg(long)]
    pub json: bool,

    /// Maximum number of pages to crawl [default: 50]
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum link hops from the start page [default: 3]
    ///
    /// Pages at this depth are still checked, but their links are not followed
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Extra domain to crawl as part of the site (repeatable)
    ///
    /// Subdomains of an allowed domain are included automatically
    #[arg(long = "allow-domain", value_name = "DOMAIN")]
    pub allowed_domains: Vec<String>,
}

impl CheckArgs {
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            allowed_domains: if self.allowed_domains.is_empty() {
                None
            } else {
                Some(self.allowed_domains.clone())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["link-sentinel", "check", "https://example.com"]).unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.website_url, "https://example.com");
        assert!(!args.json);
        assert_eq!(args.crawl_options(), CrawlOptions::default());
    }

    #[test]
    fn test_check_with_options() {
        let cli = Cli::try_parse_from([
            "link-sentinel",
            "check",
            "https://example.com",
            "--json",
            "--max-pages",
            "10",
            "--max-depth",
            "1",
            "--allow-domain",
            "docs.example.org",
            "--allow-domain",
            "cdn.example.net",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        let options = args.crawl_options();
        assert!(args.json);
        assert_eq!(options.max_pages, Some(10));
        assert_eq!(options.max_depth, Some(1));
        assert_eq!(
            options.allowed_domains,
            Some(vec!["docs.example.org".to_string(), "cdn.example.net".to_string()])
        );
    }

    #[test]
    fn test_serve_takes_no_arguments() {
        assert!(matches!(
            Cli::try_parse_from(["link-sentinel", "serve"]).unwrap().command,
            Commands::Serve
        ));
        assert!(Cli::try_parse_from(["link-sentinel", "serve", "extra"]).is_err());
    }
}
