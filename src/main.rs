//! Kagami main entry point
//!
//! Command-line interface over a single source definition. Every data
//! command prints JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{StreamExt, TryStreamExt};
use kagami::model::CatalogEntry;
use kagami::{MediaPreferences, SearchQuery, Source};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kagami: declarative catalog extraction and embed resolution
///
/// Reads a TOML source definition and runs listing, search, detail, unit
/// and media operations against that website.
#[derive(Parser, Debug)]
#[command(name = "kagami")]
#[command(version)]
#[command(about = "Declarative catalog extraction and embed resolution", long_about = None)]
struct Cli {
    /// Path to TOML source definition
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the source definition and print its capabilities
    Check,

    /// Walk a named listing ("popular", "latest", ...)
    List {
        name: String,

        /// Stop after this many pages (the listing's max-pages still applies)
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Search by text, `path:<slug>` or a link on the source's site
    Search {
        query: String,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Fetch the detail page of an entry
    Details { identifier: String },

    /// List the units (episodes / chapters) of an entry
    Units { identifier: String },

    /// Resolve a unit locator into playable media
    Media {
        locator: String,

        /// Preferred quality substring (overrides the source definition)
        #[arg(long)]
        quality: Option<String>,

        /// Preferred language substring
        #[arg(long)]
        language: Option<String>,

        /// Preferred server substring
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    page: u32,
    has_next: bool,
    entries: &'a [CatalogEntry],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut source = Source::from_path(&cli.config)
        .with_context(|| format!("Failed to load source from {}", cli.config.display()))?;

    match cli.command {
        Command::Check => {
            print_json(source.capabilities())?;
            tracing::info!("Source '{}' is valid", source.name());
        }
        Command::List { name, pages } => {
            let entries: Vec<CatalogEntry> = source
                .listing(&name)?
                .take(pages.max(1))
                .try_concat()
                .await
                .with_context(|| format!("Listing '{}' failed", name))?;
            tracing::info!("Listed {} entries from '{}'", entries.len(), name);
            print_json(&entries)?;
        }
        Command::Search { query, page } => {
            let query = source
                .deep_link_query(&query)
                .unwrap_or_else(|| SearchQuery::parse(&query));
            let result = source.search(&query, page).await.context("Search failed")?;
            print_json(&SearchOutput {
                page,
                has_next: result.has_next,
                entries: &result.items,
            })?;
        }
        Command::Details { identifier } => {
            let entry = source
                .details(&identifier)
                .await
                .with_context(|| format!("Failed to load details for {}", identifier))?;
            print_json(&entry)?;
        }
        Command::Units { identifier } => {
            let units = source
                .units(&identifier)
                .await
                .with_context(|| format!("Failed to list units for {}", identifier))?;
            tracing::info!("Found {} units", units.len());
            print_json(&units)?;
        }
        Command::Media {
            locator,
            quality,
            language,
            server,
        } => {
            let defaults = source.preferences().clone();
            source.set_preferences(MediaPreferences {
                quality: quality.or(defaults.quality),
                language: language.or(defaults.language),
                server: server.or(defaults.server),
            });

            let media = source
                .media(&locator)
                .await
                .with_context(|| format!("Failed to resolve media for {}", locator))?;
            if media.is_empty() {
                tracing::warn!("No playable media found for {}", locator);
            }
            print_json(&media)?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kagami=info,warn"),
            1 => EnvFilter::new("kagami=debug,info"),
            2 => EnvFilter::new("kagami=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
