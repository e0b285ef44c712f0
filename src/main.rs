//! Harrow main entry point
//!
//! This is the command-line interface for the Harrow web harvester.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use harrow::config::{load_config_with_hash, Config};
use harrow::output::{write_links, write_results, write_tables, OutputFormat};
use harrow::url::normalize_input_url;
use harrow::{BatchFetcher, Coordinator, CrawlOptions, Extractor, Fetcher, SelectorSpec};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Harrow: a selector-driven web harvester
///
/// Harrow fetches pages with rotating browser identities and optional
/// proxies, and extracts fields, links and tables with CSS selectors. Data
/// goes to stdout (or --output); logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "harrow")]
#[command(version = "1.0.0")]
#[command(about = "A selector-driven web harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Output format: json, csv or text
    #[arg(short, long, default_value = "json", global = true)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,

    /// Validate config and show the effective settings without fetching anything
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the configured fields from one page
    Extract {
        url: String,
    },

    /// Crawl a site breadth-first, extracting fields from every page
    Crawl {
        url: String,

        /// Maximum number of pages to process
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link depth to follow
        #[arg(long)]
        max_depth: Option<u32>,

        /// CSS selector for the links to follow
        #[arg(long)]
        link_selector: Option<String>,
    },

    /// Extract the configured fields from many pages concurrently
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Extract HTML tables from one page
    Tables {
        url: String,

        /// CSS selector for the table elements
        #[arg(short, long)]
        selector: Option<String>,
    },

    /// List the same-origin links of one page
    Links {
        url: String,

        /// CSS selector for the link elements
        #[arg(short, long)]
        selector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let Some(command) = cli.command else {
        bail!("no command given; run with --help for usage");
    };

    let fetcher = Arc::new(Fetcher::from_config(&config).context("failed to build HTTP client")?);
    if config.fetcher.use_proxies {
        let loaded = fetcher.load_proxies(&config.proxies.sources).await;
        if loaded == 0 {
            tracing::warn!("No proxies available, using direct connections");
        }
    }
    let extractor = Extractor::new(fetcher);

    let writer = open_output(cli.output.as_ref())?;

    match command {
        Command::Extract { url } => handle_extract(&extractor, &config, &url, cli.format, writer).await,
        Command::Crawl {
            url,
            max_pages,
            max_depth,
            link_selector,
        } => {
            let mut options = CrawlOptions::from(&config.crawl);
            if let Some(max_pages) = max_pages {
                options.max_pages = max_pages;
            }
            if let Some(max_depth) = max_depth {
                options.max_depth = max_depth;
            }
            if link_selector.is_some() {
                options.link_selector = link_selector;
            }
            handle_crawl(extractor, &config, &url, &options, cli.format, writer).await
        }
        Command::Batch { urls, workers } => {
            let workers = workers.unwrap_or(config.batch.max_workers);
            handle_batch(extractor, &config, &urls, workers, cli.format, writer).await
        }
        Command::Tables { url, selector } => {
            let selector = selector.unwrap_or_else(|| config.tables.selector.clone());
            handle_tables(&extractor, &url, &selector, cli.format, writer).await
        }
        Command::Links { url, selector } => {
            let selector = selector.or_else(|| config.crawl.link_selector.clone());
            handle_links(&extractor, &url, selector.as_deref(), cli.format, writer).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harrow=info,warn"),
            1 => EnvFilter::new("harrow=debug,info"),
            2 => EnvFilter::new("harrow=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_output(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

/// Builds the selector spec, which field-extracting commands require
fn selector_spec(config: &Config) -> anyhow::Result<SelectorSpec> {
    let spec = SelectorSpec::from_entries(&config.selectors)?;
    if spec.is_empty() {
        bail!("no fields to extract; add [[selector]] entries to the config file");
    }
    Ok(spec)
}

fn parse_target(url: &str) -> anyhow::Result<String> {
    let url = normalize_input_url(url).with_context(|| format!("invalid URL '{}'", url))?;
    Ok(url.to_string())
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Harrow Dry Run ===\n");

    println!("Fetcher:");
    println!("  Delay: {}s (jittered 0.5x to 1.5x)", config.fetcher.delay);
    println!("  Timeout: {}s", config.fetcher.timeout);
    println!("  Verify TLS: {}", config.fetcher.verify_tls);
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!(
        "  Backoff: {}s to {}s",
        config.fetcher.backoff_min, config.fetcher.backoff_max
    );
    match &config.fetcher.user_agents_file {
        Some(path) => println!("  User agents: {}", path),
        None => println!("  User agents: built-in list"),
    }

    println!("\nProxies:");
    println!("  Enabled: {}", config.fetcher.use_proxies);
    for source in &config.proxies.sources {
        println!("  - {}", source);
    }

    println!("\nCrawl:");
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Max depth: {}", config.crawl.max_depth);
    println!(
        "  Link selector: {}",
        config.crawl.link_selector.as_deref().unwrap_or("a[href]")
    );

    println!("\nBatch:");
    println!("  Max workers: {}", config.batch.max_workers);

    println!("\nTables:");
    println!("  Selector: {}", config.tables.selector);

    println!("\nFields ({}):", config.selectors.len());
    for entry in &config.selectors {
        println!("  - {}: {}", entry.field, entry.css);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles single-page field extraction
async fn handle_extract(
    extractor: &Extractor,
    config: &Config,
    url: &str,
    format: OutputFormat,
    writer: Box<dyn Write>,
) -> anyhow::Result<()> {
    let spec = selector_spec(config)?;
    let url = parse_target(url)?;

    let Some(result) = extractor.extract_fields(&url, &spec).await else {
        bail!("could not fetch {}", url);
    };

    write_results(&[result], format, writer)?;
    Ok(())
}

/// Handles the breadth-first crawl
async fn handle_crawl(
    extractor: Extractor,
    config: &Config,
    url: &str,
    options: &CrawlOptions,
    format: OutputFormat,
    writer: Box<dyn Write>,
) -> anyhow::Result<()> {
    let spec = selector_spec(config)?;
    let url = parse_target(url)?;

    let results = Coordinator::new(extractor).crawl(&url, &spec, options).await?;
    tracing::info!("Crawl completed with {} results", results.len());

    write_results(&results, format, writer)?;
    Ok(())
}

/// Handles concurrent extraction over a URL list
async fn handle_batch(
    extractor: Extractor,
    config: &Config,
    urls: &[String],
    workers: usize,
    format: OutputFormat,
    writer: Box<dyn Write>,
) -> anyhow::Result<()> {
    let spec = selector_spec(config)?;
    let urls = urls
        .iter()
        .map(|url| parse_target(url))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let results = BatchFetcher::new(extractor)
        .crawl_many(&urls, &spec, workers)
        .await?;

    write_results(&results, format, writer)?;
    Ok(())
}

/// Handles table extraction
async fn handle_tables(
    extractor: &Extractor,
    url: &str,
    selector: &str,
    format: OutputFormat,
    writer: Box<dyn Write>,
) -> anyhow::Result<()> {
    let url = parse_target(url)?;

    let Some(tables) = extractor.extract_tables(&url, Some(selector)).await else {
        bail!("could not fetch {}", url);
    };
    tracing::info!("Found {} tables", tables.len());

    write_tables(&tables, format, writer)?;
    Ok(())
}

/// Handles link listing
async fn handle_links(
    extractor: &Extractor,
    url: &str,
    selector: Option<&str>,
    format: OutputFormat,
    writer: Box<dyn Write>,
) -> anyhow::Result<()> {
    let url = parse_target(url)?;

    let Some(links) = extractor.extract_links(&url, selector, &HashSet::new()).await else {
        bail!("could not fetch {}", url);
    };
    tracing::info!("Found {} links", links.len());

    write_links(&links, format, writer)?;
    Ok(())
}
