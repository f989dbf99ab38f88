mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Command, CrawlArgs, RenameArgs, StatsArgs};
use crate::error::{ErrorKind, Result};
use crate::logging::DebugLog;
use clap::Parser;
use exn::ResultExt;
use galerie_client::{Chrome, ChromiumBrowser, HttpFetcher, USER_AGENT};
use galerie_config::Config;
use galerie_library::rename::{self, Mode, RenameReport};
use galerie_library::{CollectionStats, CrawlOptions, Crawler, Summary};
use galerie_storage::RunLayout;
use std::process::ExitCode;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let debug_log = matches!(cli.command, Command::Crawl(_)).then(DebugLog::default);
    logging::init(cli.verbose, debug_log.clone())?;
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Crawl(args) => run_crawl(&config, debug_log.unwrap_or_default(), args).await,
        Command::Rename(args) => run_rename(&config, args).await,
        Command::Stats(args) => run_stats(&config, args).await,
    }
}

async fn run_crawl(config: &Config, debug_log: DebugLog, args: CrawlArgs) -> Result<()> {
    let assets = &config.output.assets;
    let layout = if config.output.timestamped_runs && !args.no_timestamp {
        RunLayout::timestamped(assets, OffsetDateTime::now_utc()).or_raise(|| ErrorKind::Output)?
    } else {
        RunLayout::fixed(assets)
    };
    layout.create().await.or_raise(|| ErrorKind::Output)?;
    if config.crawl.debug_log {
        debug_log.open(&layout.debug_log_path())?;
    }
    tracing::info!(run = %layout.root().display(), start = %config.site.start_url, "Starting crawl");

    let chrome = Chrome::new(config.crawl.chrome_executable.as_deref()).or_raise(|| ErrorKind::Browser)?;
    let fetcher = HttpFetcher::new(config.download.timeout(), USER_AGENT).or_raise(|| ErrorKind::Http)?;
    let browser = ChromiumBrowser::launch(&chrome, config.crawl.headless).await.or_raise(|| ErrorKind::Browser)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; finishing the current step and saving");
                cancel.cancel();
            }
        }
    });

    let options = CrawlOptions { limit: args.categories, only: args.only };
    let outcome = {
        let crawler = Crawler::new(&browser, &fetcher, config, &layout).with_cancellation(cancel);
        match crawler.prepare_session().await {
            Ok(mut session) => crawler.run(&mut session, &options).await,
            Err(err) => Err(err),
        }
    };
    if let Err(err) = browser.shutdown().await {
        tracing::debug!(error = ?err, "Browser did not shut down cleanly");
    }
    let summary = outcome.or_raise(|| ErrorKind::Crawl)?;
    print_summary(&summary);

    if args.rename && summary.new_images > 0 {
        let report = rename::rename_collection(&layout.metadata_path(), Mode::Live)
            .await
            .or_raise(|| ErrorKind::Rename)?;
        print_report(&report, Mode::Live);
    }
    Ok(())
}

async fn run_rename(config: &Config, args: RenameArgs) -> Result<()> {
    let mode = if args.live { Mode::Live } else { Mode::DryRun };
    let reports = if args.metadata.is_empty() {
        rename::rename_all(&config.output.assets, mode).await.or_raise(|| ErrorKind::Rename)?
    } else {
        let mut reports = Vec::with_capacity(args.metadata.len());
        for path in &args.metadata {
            reports.push(rename::rename_collection(path, mode).await.or_raise(|| ErrorKind::Rename)?);
        }
        reports
    };
    if reports.is_empty() {
        println!("No metadata files found under {}", config.output.assets.display());
    }
    reports.iter().for_each(|report| print_report(report, mode));
    if mode == Mode::DryRun && reports.iter().any(|r| r.planned > 0) {
        println!("Dry run only; pass --live to apply.");
    }
    Ok(())
}

async fn run_stats(config: &Config, args: StatsArgs) -> Result<()> {
    let stats = CollectionStats::collect(&config.output.assets, args.metadata.as_deref())
        .await
        .or_raise(|| ErrorKind::Stats)?;
    println!("Images:     {}", stats.total_images);
    println!("Size:       {:.1} MiB", stats.total_mib());
    println!("Previews:   {}", stats.previews);
    println!("With title: {}", stats.with_titles);
    println!("Crawl runs: {}", stats.crawl_runs);
    println!("Categories: {}", stats.categories.len());
    for (category, count) in &stats.categories {
        println!("  {category:<30} {count:>6}");
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    if summary.cancelled {
        println!("Crawl interrupted; progress has been saved.");
    }
    println!("Run directory:        {}", summary.run_dir.display());
    println!("Pages visited:        {}", summary.pages_visited);
    println!("Categories processed: {}", summary.categories_processed);
    println!("New images:           {}", summary.new_images);
    println!("Images in collection: {}", summary.total_images);
    if !summary.categories_found.is_empty() {
        println!("Categories:           {}", summary.categories_found.join(", "));
    }
}

fn print_report(report: &RenameReport, mode: Mode) {
    let changed = match mode {
        Mode::Live => format!("{} renamed", report.renamed),
        Mode::DryRun => format!("{} to rename", report.planned),
    };
    println!(
        "{}: {} records, {changed}, {} unchanged, {} errors",
        report.metadata_file.display(),
        report.processed,
        report.unchanged,
        report.errors,
    );
    for (from, to) in &report.categories_updated {
        println!("  category {from} -> {to}");
    }
}
