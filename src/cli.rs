//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use discovery_core::{DEFAULT_MAX_PAGE_ATTEMPTS, DEFAULT_PAGE_SIZE};

/// Discover new work identifiers from a paginated listing.
///
/// Pages through the listing at `--endpoint`, keeps works that pass the
/// filter settings and are not yet in the history database, and prints one
/// `kind:id` per line to stdout.
#[derive(Parser, Debug)]
#[command(name = "discovery")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Listing endpoint URL (http or https)
    #[arg(short, long)]
    pub endpoint: String,

    /// JSON settings file with filter options
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Works requested per page (1-500)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub page_size: u32,

    /// Stop after this many pages (default: until the listing is exhausted)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_limit: Option<u32>,

    /// Delay between page requests in milliseconds (max 60000)
    #[arg(short = 'd', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub page_delay: u64,

    /// Attempts per page for transient failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_PAGE_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// SQLite database of previously processed works
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Record discovered works in the history database after the run
    #[arg(long, requires = "history")]
    pub record: bool,

    /// Connect timeout for listing requests in seconds (1-3600)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout_secs: u64,

    /// Read timeout for listing requests in seconds (1-3600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout_secs: u64,
}
