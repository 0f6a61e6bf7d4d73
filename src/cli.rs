// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There are no subcommands: the tool always reads one bookmark file and writes
// one export file. Everything else is a flag:
//
//   bookmark-export                          # default Chrome profile -> exported_bookmarks.csv
//   bookmark-export ~/Bookmarks -o out.xlsx  # explicit input, spreadsheet output
//   bookmark-export -c --concurrency 50      # also check which links are alive
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::checker::{
    CheckerConfig, ProbeMethod, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Output file used when --output isn't given
pub const DEFAULT_OUTPUT: &str = "exported_bookmarks.csv";

#[derive(Parser, Debug)]
#[command(
    name = "bookmark-export",
    version,
    about = "Export browser bookmarks to CSV or a spreadsheet, optionally checking which links still work",
    long_about = "bookmark-export reads a Chrome/Chromium bookmark file, flattens its folders into one \
                  row per bookmark and writes them to a .csv, .tsv or .xlsx file. With --check-status \
                  every link is probed concurrently and its status is added as an extra column."
)]
pub struct Cli {
    /// Path to the browser's Bookmarks file
    ///
    /// Defaults to the Default profile of Chrome (or Chromium) for the current OS
    pub bookmarks_file: Option<PathBuf>,

    /// Output file; the extension picks the format (.csv, .tsv or .xlsx)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Check whether each bookmarked site is still reachable
    #[arg(short = 'c', long)]
    pub check_status: bool,

    /// Maximum number of links checked at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Stop checking after this many seconds; unchecked links are exported as Unknown
    #[arg(long)]
    pub deadline: Option<u64>,

    /// HTTP method used for the first request to each link
    #[arg(long, value_enum, default_value_t = ProbeMethod::Head)]
    pub method: ProbeMethod,

    /// Don't retry with GET when a server refuses HEAD
    #[arg(long)]
    pub no_get_fallback: bool,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Treat invalid TLS certificates as failures
    #[arg(long)]
    pub verify_tls: bool,

    /// Sort rows by folder instead of keeping the browser's order
    #[arg(long)]
    pub sort_by_folder: bool,

    /// Exit with code 1 if any link is down
    #[arg(long, requires = "check_status")]
    pub fail_on_dead: bool,

    /// Show debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Status checker settings taken from the flags
    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig {
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout),
            method: self.method,
            get_fallback: !self.no_get_fallback,
            verify_tls: self.verify_tls,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Run-level time limit for the status check
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline.map(Duration::from_secs)
    }
}

/// The first existing default bookmark file for this platform, if any
pub fn default_bookmarks_path() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.is_file())
}

#[cfg(target_os = "windows")]
fn candidate_paths() -> Vec<PathBuf> {
    std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .map(|base| {
            vec![
                base.join(r"Google\Chrome\User Data\Default\Bookmarks"),
                base.join(r"Chromium\User Data\Default\Bookmarks"),
            ]
        })
        .unwrap_or_default()
}

#[cfg(target_os = "macos")]
fn candidate_paths() -> Vec<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| {
            let support = home.join("Library/Application Support");
            vec![
                support.join("Google/Chrome/Default/Bookmarks"),
                support.join("Chromium/Default/Bookmarks"),
            ]
        })
        .unwrap_or_default()
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn candidate_paths() -> Vec<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| {
            vec![
                home.join(".config/google-chrome/Default/Bookmarks"),
                home.join(".config/chromium/Default/Bookmarks"),
            ]
        })
        .unwrap_or_default()
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why Option<PathBuf> for the input?
//    - A positional argument without a default becomes optional this way
//    - None means "look in the usual browser profile location"
//
// 2. Why is --timeout a plain number of seconds?
//    - It keeps the flag easy to type; it's turned into a Duration in
//      checker_config() so the rest of the code never deals with raw numbers
// -----------------------------------------------------------------------------
