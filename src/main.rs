//! CLI entry point for the departure predictor.
//!
//! Provides subcommands for answering a single prediction query from
//! local or remote day files, downloading a date range of day files,
//! and summarizing what conditions the historical data covers.

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use departure_predictor::{
    fetch::{BasicClient, fetch_text, load_day_blobs},
    output::{PredictionRow, append_row, print_json},
    query::Query,
    schema::RecordSchema,
    service::Predictor,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "departure_predictor")]
#[command(about = "Predicts the next departure at a stop from logged observation history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one query against historical day files
    Predict {
        /// Day files: paths, directories of files, or URLs (one day each)
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,

        /// Query time as HH:MM (defaults to the current local time)
        #[arg(short, long)]
        time: Option<String>,

        /// Day-of-week label (defaults to the current local weekday)
        #[arg(short, long)]
        day: Option<String>,

        /// Weather label
        #[arg(short, long)]
        weather: String,

        /// JSON file overriding the column layout
        #[arg(long)]
        schema: Option<String>,

        /// CSV file to append the prediction to
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum number of day files loaded concurrently
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
    /// Download a date range of day files
    Fetch {
        /// URL template with a {date} placeholder,
        /// e.g. https://example.com/data/{date}_com2.csv
        #[arg(value_name = "URL_TEMPLATE")]
        url_template: String,

        /// First date to fetch (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last date to fetch, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Directory to save day files into
        #[arg(short, long, default_value = "data")]
        output_dir: String,

        /// Maximum number of concurrent downloads
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
    /// Summarize which day/weather conditions the history covers
    Coverage {
        /// Day files: paths, directories of files, or URLs (one day each)
        #[arg(value_name = "SOURCE", required = true)]
        sources: Vec<String>,

        /// JSON file overriding the column layout
        #[arg(long)]
        schema: Option<String>,

        /// Maximum number of day files loaded concurrently
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/departure_predictor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("departure_predictor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            sources,
            time,
            day,
            weather,
            schema,
            output,
            concurrency,
        } => {
            let predictor = build_predictor(&sources, schema.as_deref(), concurrency).await?;

            let now = Local::now();
            let query = Query {
                time: time.unwrap_or_else(|| now.format("%H:%M").to_string()),
                day: day.unwrap_or_else(|| now.format("%A").to_string()),
                weather,
            };
            info!(
                time = %query.time,
                day = %query.day,
                weather = %query.weather,
                "Running query"
            );

            match predictor.predict(&query)? {
                Some(result) => {
                    print_json(&result)?;
                    if let Some(path) = output {
                        append_row(&path, &PredictionRow::new(&query, &result))?;
                    }
                }
                None => {
                    info!("No historical records match this condition");
                }
            }
        }
        Commands::Fetch {
            url_template,
            start,
            end,
            output_dir,
            concurrency,
        } => {
            fetch_date_range(&url_template, &start, &end, &output_dir, concurrency).await?;
        }
        Commands::Coverage {
            sources,
            schema,
            concurrency,
        } => {
            let predictor = build_predictor(&sources, schema.as_deref(), concurrency).await?;

            let entries = predictor.index().coverage();
            for entry in &entries {
                info!(
                    day = %entry.day,
                    weather = %entry.weather,
                    time_slots = entry.slots,
                    records = entry.records,
                    "Coverage"
                );
            }
            info!(
                conditions = entries.len(),
                records = predictor.index().record_count(),
                "Coverage summary"
            );
        }
    }

    Ok(())
}

/// Loads the column layout, gathers day blobs, and builds the predictor.
async fn build_predictor(
    sources: &[String],
    schema_path: Option<&str>,
    concurrency: usize,
) -> Result<Predictor> {
    let schema = load_schema(schema_path)?;
    let sources = expand_sources(sources)?;
    info!(days = sources.len(), "Loading historical day files");

    let blobs = load_day_blobs(&sources, concurrency).await;
    if blobs.len() < sources.len() {
        warn!(
            loaded = blobs.len(),
            requested = sources.len(),
            "Some day files could not be loaded"
        );
    }

    Ok(Predictor::from_blobs(blobs, schema))
}

fn load_schema(path: Option<&str>) -> Result<RecordSchema> {
    match path {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("reading schema {path}"))?;
            RecordSchema::from_json(&text).with_context(|| format!("parsing schema {path}"))
        }
        None => Ok(RecordSchema::default()),
    }
}

/// Expands directory arguments into their contained files, sorted by
/// name so date-named day files load in chronological order.
fn expand_sources(args: &[String]) -> Result<Vec<String>> {
    let mut sources = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        if path.is_dir() {
            let mut files: Vec<String> = std::fs::read_dir(path)
                .with_context(|| format!("reading directory {arg}"))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .map(|p| p.display().to_string())
                .collect();
            files.sort();
            sources.extend(files);
        } else {
            sources.push(arg.clone());
        }
    }
    Ok(sources)
}

/// Downloads one file per date in `[start, end]`, skipping dates that
/// fail so one bad day never aborts the batch.
async fn fetch_date_range(
    url_template: &str,
    start: &str,
    end: &str,
    output_dir: &str,
    concurrency: usize,
) -> Result<()> {
    if !url_template.contains("{date}") {
        bail!("URL template must contain a {{date}} placeholder");
    }
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").context("parsing --start")?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").context("parsing --end")?;
    if end < start {
        bail!("--end is before --start");
    }

    std::fs::create_dir_all(output_dir)?;

    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut tasks = vec![];

    let mut date = start;
    while date <= end {
        let date_str = date.format("%Y-%m-%d").to_string();
        let url = url_template.replace("{date}", &date_str);
        let target = format!("{output_dir}/{date_str}.csv");
        let sem = semaphore.clone();

        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return false;
            };
            let client = BasicClient::new();
            match fetch_text(&client, &url).await {
                Ok(body) => match std::fs::write(&target, body) {
                    Ok(()) => {
                        info!(date = %date_str, file = %target, "Day file saved");
                        true
                    }
                    Err(e) => {
                        warn!(date = %date_str, error = %e, "Failed to write day file");
                        false
                    }
                },
                Err(e) => {
                    warn!(date = %date_str, url = %url, error = %e, "Skipping date");
                    false
                }
            }
        }));

        let Some(next) = date.succ_opt() else { break };
        date = next;
    }

    let mut saved = 0usize;
    let total = tasks.len();
    for task in tasks {
        if matches!(task.await, Ok(true)) {
            saved += 1;
        }
    }
    info!(saved, total, output_dir, "Fetch complete");
    Ok(())
}
