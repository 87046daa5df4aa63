// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up tracing (diagnostics on stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Print events as the crawl streams them
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
//
// Rust concepts used:
// - async/await: The crawl and its link checks run on the tokio runtime
// - Channels: The engine pushes events, this file pulls and prints them
// - match: Pattern matching to handle different subcommands and events
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{CheckArgs, Cli, Commands};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use link_sentinel::{
    BrokenLinkRecord, ChannelSink, ControlCommand, CrawlEngine, CrawlEvent, CrawlSettings,
    ProgressSink, ReqwestFetcher, SessionEvent, SessionRegistry, TaggedSink,
};

// The stdin/stdout pair is the one and only channel in serve mode
const STDIO_CHANNEL: u32 = 0;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so stdout stays clean for results and JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Ok(2) = the crawl could not start
//   Err = unexpected error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => handle_check(args).await,
        Commands::Serve => handle_serve().await,
    }
}

// Handles the 'check' subcommand
async fn handle_check(args: CheckArgs) -> Result<i32> {
    let settings = CrawlSettings::default();
    let fetcher = Arc::new(ReqwestFetcher::new(&settings)?);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = CrawlEngine::new(fetcher, Arc::new(ChannelSink::new(tx)), settings);

    // Ctrl-C stops the crawl; we still get `finished` with what was found
    let control = engine.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping crawl");
            control.stop();
        }
    });

    let options = args.crawl_options();
    let seed = args.website_url.clone();
    let crawl = tokio::spawn(async move {
        let result = engine.start(&seed, &options).await;
        (result, engine.pages_crawled())
    });

    // The channel closes once the engine and every link checker are done
    while let Some(event) = rx.recv().await {
        print_event(&event, args.json)?;
    }

    let (result, pages) = crawl.await?;
    let broken = match result {
        Ok(broken) => broken,
        Err(e) => {
            info!("crawl did not start: {}", e);
            return Ok(2);
        }
    };

    if !args.json {
        print_table(&broken, pages);
    }

    if broken.is_empty() {
        Ok(0)  // Exit code 0 = all good
    } else {
        Ok(1)  // Exit code 1 = broken links found
    }
}

// Handles the 'serve' subcommand
//
// Each stdin line is a ControlCommand; each stdout line is a SessionEvent.
// Sessions are numbered from 1 in startCrawl order; channel-level errors
// (unparseable commands) carry session 0. EOF on stdin counts as the caller
// disconnecting.
async fn handle_serve() -> Result<i32> {
    let settings = CrawlSettings::default();
    let fetcher = Arc::new(ReqwestFetcher::new(&settings)?);
    let mut registry = SessionRegistry::new(fetcher, settings);

    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
    let channel_sink: Arc<dyn ProgressSink> = Arc::new(TaggedSink::new(0, tx.clone()));
    let mut last_session: u64 = 0;

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("could not serialize event: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ControlCommand>(&line) {
            Ok(command) => {
                let sink: Arc<dyn ProgressSink> = match &command {
                    ControlCommand::StartCrawl { .. } => {
                        last_session += 1;
                        Arc::new(TaggedSink::new(last_session, tx.clone()))
                    }
                    ControlCommand::StopCrawl => channel_sink.clone(),
                };
                registry.apply(STDIO_CHANNEL, command, sink);
            }
            Err(e) => channel_sink.emit(CrawlEvent::Error(format!("Invalid command: {}", e))),
        }
    }

    info!("stdin closed, ending session");
    registry.disconnect(&STDIO_CHANNEL);
    // The writer ends once the last running session drops its sender
    drop(channel_sink);
    drop(tx);
    writer.await?;

    Ok(0)
}

// Prints one event, either as a JSON line or as a human-readable line
fn print_event(event: &CrawlEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        CrawlEvent::Log(message) => println!("   {}", message),
        CrawlEvent::Progress(update) => println!(
            "🔍 [{}] depth {}: {} ({} queued)",
            update.count, update.depth, update.url, update.queue_size
        ),
        CrawlEvent::BrokenLink(record) => println!(
            "❌ {} - {} (found on {})",
            record.url, record.status, record.source
        ),
        CrawlEvent::Error(message) => eprintln!("⚠️  {}", message),
        // The summary table is printed once the crawl returns
        CrawlEvent::Finished { .. } => {}
    }
    Ok(())
}

// Prints broken links as a human-readable table in the terminal
fn print_table(broken: &[BrokenLinkRecord], pages: usize) {
    println!();

    if !broken.is_empty() {
        println!("{:<60} {:<20} {:<40}", "URL", "STATUS", "FOUND ON");
        println!("{}", "=".repeat(120));

        for record in broken {
            // Truncate URL if too long for display
            let url_display = if record.url.chars().count() > 57 {
                format!("{}...", record.url.chars().take(57).collect::<String>())
            } else {
                record.url.clone()
            };

            println!(
                "{:<60} {:<20} {:<40}",
                url_display,
                record.status.to_string(),
                record.source.to_string()
            );
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", pages);
    println!("   ❌ Broken: {}", broken.len());
}
