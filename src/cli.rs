use clap::{ArgAction, Args, Parser, Subcommand};
use galerie_library::CategoryLimit;
use std::path::PathBuf;

/// Crawl an Odexpo painting gallery and keep the downloaded images organized.
#[derive(Debug, Parser)]
#[command(name = "galerie", version, about)]
pub struct Cli {
    /// Configuration file (toml, yaml or json).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// More output; repeat for trace-level logging.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl the gallery and download new images.
    Crawl(CrawlArgs),
    /// Rename downloaded files after their titles and clean category folders.
    Rename(RenameArgs),
    /// Summarize the downloaded collection.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// How many categories to crawl: a number, or `all`.
    #[arg(long, value_name = "N|all", default_value = "all", value_parser = parse_limit)]
    pub categories: CategoryLimit,
    /// Only crawl categories whose name contains this text.
    #[arg(long, value_name = "NAME")]
    pub only: Option<String>,
    /// Write into the assets directory instead of a new timestamped run.
    #[arg(long)]
    pub no_timestamp: bool,
    /// Run a live rename pass over this run once the crawl finishes.
    #[arg(long)]
    pub rename: bool,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Move files and rewrite metadata (default is a dry run).
    #[arg(long)]
    pub live: bool,
    /// Metadata files to process; defaults to every one under the assets root.
    pub metadata: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// A single metadata file; defaults to every one under the assets root.
    pub metadata: Option<PathBuf>,
}

fn parse_limit(value: &str) -> Result<CategoryLimit, String> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("all") => Ok(CategoryLimit::All),
        v => match v.parse::<usize>() {
            Ok(0) => Err("must be at least 1".to_string()),
            Ok(n) => Ok(CategoryLimit::First(n)),
            Err(_) => Err(format!("expected a number or `all`, got `{v}`")),
        },
    }
}
