//! doi-dates: resolve DOI columns in CSV files to Crossref publication dates.
//!
//! Reads one or more CSV files, resolves every DOI once under bounded
//! concurrency, then writes a full report and, when a date range is given, a
//! filtered one. Ctrl-C cancels the run; whatever resolved so far is still
//! written, with the remainder marked `cancelled`.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::{print_summary, read_batch, timestamped_name, write_csv, CliError};
use doi_resolver::{DateRange, ProgressFn, Resolver, ResolverConfig, YearMonth};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "doi-dates")]
#[command(about = "Resolve DOI columns in CSV files to Crossref publication dates")]
struct Args {
    /// Input CSV files containing a DOI column
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Column header to read DOIs from (default: first header containing "doi")
    #[arg(long, value_name = "NAME")]
    column: Option<String>,

    /// Number of concurrent lookups
    #[arg(short, long, default_value_t = 5)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    timeout: u64,

    /// Total attempts per DOI, including the first
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Request-rate ceiling, lookups per second
    #[arg(long, default_value_t = 10.0, value_name = "N")]
    rate: f64,

    /// Inclusive start of the date filter
    #[arg(long, value_name = "YYYY-MM")]
    start: Option<YearMonth>,

    /// Inclusive end of the date filter
    #[arg(long, value_name = "YYYY-MM")]
    end: Option<YearMonth>,

    /// Path for the full report (default: doi_dates_full_<timestamp>.csv)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path for the filtered report (default: doi_dates_filtered_<timestamp>.csv)
    #[arg(long, value_name = "PATH")]
    filtered_output: Option<PathBuf>,

    /// Verbose: log lookups, retries and worker activity
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(args).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let range = DateRange {
        start: args.start,
        end: args.end,
    };
    let config = ResolverConfig {
        concurrency: args.concurrency,
        request_timeout: Duration::from_secs(args.timeout),
        max_attempts: args.attempts,
        rate_per_sec: args.rate,
        date_range: range,
        ..ResolverConfig::default()
    };
    let resolver = Resolver::new(config)?;

    let mut batches = Vec::new();
    for path in &args.files {
        let batch = read_batch(path, args.column.as_deref())?;
        eprintln!("loaded {}: {} DOI tokens", batch.source, batch.tokens.len());
        batches.push(batch);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\ncancelling, writing partial results...");
                cancel.cancel();
            }
        });
    }

    let progress: ProgressFn = Arc::new(|done, total| {
        eprint!("\rresolving {done}/{total}");
        let _ = std::io::stderr().flush();
    });
    let results = resolver.run(batches, Some(progress), cancel).await;
    eprintln!();

    let full_path = args.output.unwrap_or_else(|| timestamped_name("full"));
    write_csv(&full_path, &results)?;
    println!("full results: {}", full_path.display());

    if !range.is_unbounded() {
        let filtered = results.filter(&range);
        let filtered_path = args
            .filtered_output
            .unwrap_or_else(|| timestamped_name("filtered"));
        write_csv(&filtered_path, &filtered)?;
        println!(
            "filtered results: {} ({} of {} in range)",
            filtered_path.display(),
            filtered.len(),
            results.len()
        );
    }

    print_summary(&results);
    Ok(())
}
