// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Read the bookmark file and flatten it into records
// 3. Optionally check every link's status
// 4. Write the export file
// 5. Exit with proper code (0 = success, 1 = dead links with --fail-on-dead,
//    2 = error)
// =============================================================================

mod bookmarks;
mod checker;
mod cli;
mod export;

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use bookmarks::FlatRecord;
use checker::{check_records, is_probeable, CheckReport, HttpProbe};
use cli::Cli;
use export::OutputFormat;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    std::process::exit(execute(cli).await);
}

// Runs the tool and turns the outcome into the process exit code
async fn execute(cli: Cli) -> i32 {
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole chain of causes on one line
            eprintln!("Error: {:#}", e);
            2
        }
    }
}

// RUST_LOG wins; otherwise info, or debug with --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

// Returns:
//   Ok(0) = exported
//   Ok(1) = exported, but --fail-on-dead was given and some links are down
//   Err   = nothing usable was written
async fn run(cli: Cli) -> Result<i32> {
    let input = match &cli.bookmarks_file {
        Some(path) => path.clone(),
        None => cli::default_bookmarks_path().ok_or_else(|| {
            anyhow!("no Chrome or Chromium bookmark file found; pass its path as the first argument")
        })?,
    };

    log::info!("reading bookmarks from {}", input.display());
    let store = bookmarks::read_bookmarks(&input)
        .with_context(|| format!("could not load bookmarks from {}", input.display()))?;

    log::debug!(
        "store version {:?}, checksum {}",
        store.version,
        store.checksum.as_deref().unwrap_or("none")
    );

    let mut records = bookmarks::flatten(&store.root);
    if cli.sort_by_folder {
        bookmarks::sort_by_folder(&mut records);
    }
    println!("📚 Found {} bookmark(s)", records.len());

    let mut exit_code = 0;
    if cli.check_status {
        let report = check_statuses(records, &cli).await?;
        print_summary(&report);
        if cli.fail_on_dead && report.summary.down > 0 {
            exit_code = 1;
        }
        records = report.records;
    }

    let format = OutputFormat::from_path(&cli.output);
    export::export(&records, &cli.output, format, cli.check_status)?;
    println!("✅ Exported {} bookmark(s) to {}", records.len(), cli.output.display());

    Ok(exit_code)
}

// Runs the status checker with a progress bar on stderr
async fn check_statuses(records: Vec<FlatRecord>, cli: &Cli) -> Result<CheckReport> {
    let config = cli.checker_config();
    let probe = HttpProbe::new(&config)?;

    let to_check = records.iter().filter(|r| is_probeable(&r.url)).count();
    println!(
        "🌐 Checking {} link(s), up to {} at a time...",
        to_check, config.concurrency
    );

    let progress = ProgressBar::new(to_check as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=>-"),
    );
    progress.set_message("Progress");

    let report = check_records(
        records,
        &probe,
        config.concurrency,
        stop_signal(cli.deadline()),
        |record, status| {
            log::debug!("{} -> {}", record.url, status);
            progress.inc(1);
        },
    )
    .await?;

    progress.finish_and_clear();

    // Once ctrl_c() has been polled its handler stays installed for the rest
    // of the process, so from here on a Ctrl-C has to end the process itself
    tokio::spawn(async {
        if let Some(code) = interrupt_exit_code(tokio::signal::ctrl_c()).await {
            eprintln!("Interrupted");
            std::process::exit(code);
        }
    });

    if report.interrupted {
        log::warn!(
            "status check stopped early: {} of {} link(s) checked, the rest are marked Unknown",
            report.completed,
            to_check
        );
    }

    Ok(report)
}

// Completes on Ctrl-C or when the optional deadline passes
fn stop_signal(deadline: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        let interrupt = async {
            // If the handler can't be installed, just never fire
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            log::warn!("interrupted, exporting the results collected so far");
        };

        match deadline {
            Some(limit) => {
                tokio::select! {
                    _ = interrupt => {}
                    _ = tokio::time::sleep(limit) => {
                        log::warn!("deadline of {}s reached", limit.as_secs());
                    }
                }
            }
            None => interrupt.await,
        }
    }
}

// 130 (128 + SIGINT) once `signal` fires; None if no handler could be installed
async fn interrupt_exit_code<S>(signal: S) -> Option<i32>
where
    S: Future<Output = std::io::Result<()>>,
{
    signal.await.ok().map(|_| 130)
}

fn print_summary(report: &CheckReport) {
    let summary = &report.summary;

    println!("📊 Summary:");
    println!("   ✅ Active: {}", summary.active);
    println!("   ❌ Down: {}", summary.down);
    println!("   ❔ Unknown: {}", summary.unknown);
    if summary.skipped > 0 {
        println!("   ⏭️  Not checked (not http/https): {}", summary.skipped);
    }
    if summary.not_found > 0 {
        println!(
            "{} link(s) returned \"404 Not Found\" and may be dead.",
            summary.not_found
        );
    }
}
