//! Zhihu-Comments main entry point
//!
//! This is the command-line interface for the Zhihu-Comments crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zhihu_comments::config::{load_config_with_hash, Config};
use zhihu_comments::crawler::Coordinator;

/// Zhihu-Comments: search posts and crawl their full comment trees
///
/// Requests are signed with an external signer program and sent with the
/// cookies of a session logged in elsewhere. Every fetched comment is
/// appended to a JSON-lines file as soon as its page arrives.
#[derive(Parser, Debug)]
#[command(name = "zhihu-comments")]
#[command(version = "1.0.0")]
#[command(about = "Search posts and crawl their full comment trees", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without sending requests
    #[arg(long, conflicts_with = "ping")]
    dry_run: bool,

    /// Check whether the session cookies are still logged in and exit
    #[arg(long, conflicts_with = "dry_run")]
    ping: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let coordinator = Coordinator::new(config).context("failed to set up the client")?;

    if cli.ping {
        return handle_ping(&coordinator).await;
    }

    let report = coordinator.run().await.context("crawl failed")?;
    println!(
        "✓ {} contents, {} root comments, {} comments written ({} contents failed)",
        report.contents, report.root_comments, report.comments_written, report.failed_contents
    );
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("zhihu_comments=info,warn"),
            1 => EnvFilter::new("zhihu_comments=debug,info"),
            2 => EnvFilter::new("zhihu_comments=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Zhihu-Comments Dry Run ===\n");

    println!("Client:");
    println!("  Timeout: {}s", config.client.timeout_secs);
    println!("  Proxy: {}", config.client.proxy.as_deref().unwrap_or("none"));
    println!(
        "  Retries: {} attempts, {}ms apart",
        config.client.max_attempts, config.client.retry_wait_ms
    );

    println!("\nCrawler:");
    println!("  Sub-comments: {}", config.crawler.enable_sub_comments);
    println!("  Interval: {}ms", config.crawler.crawl_interval_ms);
    println!("  Comment page size: {}", config.crawler.comment_page_size);
    if let Some(max_pages) = config.crawler.max_pages_per_walk {
        println!("  Max pages per walk: {}", max_pages);
    }

    println!("\nSearch ({} keywords):", config.search.keywords.len());
    for keyword in &config.search.keywords {
        println!("  - {}", keyword);
    }
    println!(
        "  {} pages of {} results, sort {:?}, time {:?}, type {:?}",
        config.search.pages,
        config.search.page_size,
        config.search.sort,
        config.search.time,
        config.search.result_type
    );

    println!("\nSession cookies: {}", config.session.cookies_path);
    println!("Signer: {}", config.signer.command.join(" "));

    println!("\nOutput:");
    println!("  Contents: {}", config.output.contents_path);
    println!("  Comments: {}", config.output.comments_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --ping mode: probes session liveness
async fn handle_ping(coordinator: &Coordinator) -> anyhow::Result<()> {
    if coordinator.client().ping_session().await {
        println!("✓ Session is logged in");
        Ok(())
    } else {
        anyhow::bail!("session is not logged in; refresh the cookies file")
    }
}
