//! chapter-dl command-line interface.
//!
//! Thin wrapper over the library: `crawl` runs the concurrent pipeline with
//! signal handling; the remaining subcommands are the sequential shelf
//! utilities (harvest, book assembly, statistics, chapter renaming).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chapter_dl::config::MAX_WORKERS;
use chapter_dl::{Config, Crawler};

#[derive(Parser)]
#[command(name = "chapter-dl", version, about = "Fetch, clean, and persist novel chapters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl every configured seed and write one chapter file per page
    Crawl {
        /// Path to a JSON configuration file (seed list plus tunables)
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Worker count override; invalid values fall back to the configured
        /// default
        #[arg(long)]
        workers: Option<String>,
    },
    /// Extract chapter links from a saved index page into a seed list
    Harvest {
        /// Saved index-page HTML file
        input: PathBuf,

        /// Base URL used to absolutize relative links
        #[arg(long)]
        base_url: String,

        /// Seed-list output path
        #[arg(long, default_value = "seeds.json")]
        output: PathBuf,
    },
    /// Merge downloaded chapters into a single book file
    Book {
        /// Directory holding the chapter files
        #[arg(long, default_value = "chapters")]
        dir: PathBuf,

        /// Book output path
        #[arg(long, default_value = "book.txt")]
        output: PathBuf,

        /// Title written at the top of the book
        #[arg(long, default_value = "collected chapters")]
        title: String,
    },
    /// Print character/word statistics for a chapter file
    Stats {
        /// Text file to analyze
        file: PathBuf,
    },
    /// Normalize Chinese chapter numerals in filenames to arabic digits
    Rename {
        /// Directory holding the chapter files
        #[arg(long, default_value = "chapters")]
        dir: PathBuf,

        /// Actually rename; without this flag the pass is a dry run
        #[arg(long)]
        apply: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> chapter_dl::Result<()> {
    match cli.command {
        Command::Crawl { config, workers } => {
            let mut config = load_config(&config)?;
            config.crawl.max_workers =
                effective_workers(workers.as_deref(), config.crawl.max_workers);
            if config.seeds.is_empty() {
                tracing::warn!("seed list is empty; nothing to crawl");
            }

            let crawler = Crawler::new(config)?;
            let summary = chapter_dl::run_with_shutdown(&crawler).await?;
            println!("{summary}");
        }
        Command::Harvest {
            input,
            base_url,
            output,
        } => {
            let base = url::Url::parse(&base_url)?;
            let profile = chapter_dl::HarvestConfig::default();
            let count = chapter_dl::harvest::harvest_file(&input, &output, &base, &profile)?;
            println!("harvested {count} links into {}", output.display());
        }
        Command::Book { dir, output, title } => {
            let merged = chapter_dl::book::compile_book(&dir, &output, &title)?;
            println!("merged {merged} chapters into {}", output.display());
        }
        Command::Stats { file } => {
            let stats = chapter_dl::stats::analyze_file(&file)?;
            println!("{}", file.display());
            println!("{stats}");
        }
        Command::Rename { dir, apply } => {
            let report = chapter_dl::numerals::normalize_chapter_names(&dir, !apply)?;
            if apply {
                println!(
                    "renamed {} of {} chapter files ({} skipped)",
                    report.renamed, report.total, report.skipped
                );
            } else {
                println!(
                    "would rename {} of {} chapter files; re-run with --apply",
                    report.renamed, report.total
                );
            }
        }
    }
    Ok(())
}

/// Load the configuration file, falling back to built-in defaults when the
/// default path does not exist.
fn load_config(path: &Path) -> chapter_dl::Result<Config> {
    if path.exists() {
        Config::from_file(path)
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Resolve the worker count: a valid in-range override wins, anything else
/// falls back to the configured default instead of aborting.
fn effective_workers(arg: Option<&str>, configured: usize) -> usize {
    match arg.map(str::parse::<usize>) {
        Some(Ok(n)) if (1..=MAX_WORKERS).contains(&n) => n,
        Some(_) => {
            tracing::warn!(
                configured,
                "worker count must be an integer between 1 and {MAX_WORKERS}, using configured value"
            );
            configured
        }
        None => configured,
    }
}
