use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use warpscan_batch::{BatchConfig, BatchRunner, BatchSummary, CancelFlag, Partitioning};
use warpscan_dtw::{Dtw, Euclidean, Manhattan, PointMetric, WindowedMatcher};
use warpscan_io::{CsvResultSink, Dataset, DatasetReader};

#[derive(Parser)]
#[command(name = "warpscan")]
#[command(about = "Pairwise dynamic time warping over named 2-D trajectories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Align every pair of sequences and write one CSV row per pair
    Run {
        /// Path to the input dataset (.json or .csv)
        #[arg(long)]
        data: PathBuf,

        /// Path to the result CSV (created or truncated)
        #[arg(long)]
        output: PathBuf,

        /// Window size in points; omit for full-sequence DTW
        #[arg(long)]
        window: Option<usize>,

        /// Split the outer index evenly across this many workers
        #[arg(long, default_value_t = 4, conflicts_with = "partition")]
        workers: usize,

        /// Explicit worker range `start..end` (repeatable; must tile the dataset)
        #[arg(long, value_parser = parse_partition)]
        partition: Vec<Range<usize>>,

        /// Point distance: "euclidean" or "manhattan"
        #[arg(long, default_value = "euclidean")]
        metric: String,

        /// Extra attempts for a failed row write
        #[arg(long, default_value_t = 2)]
        retries: usize,
    },

    /// Align a single pair and print the cost and warping path
    Align {
        /// Path to the input dataset (.json or .csv)
        #[arg(long)]
        data: PathBuf,

        /// Key of the first sequence
        #[arg(long)]
        first: String,

        /// Key of the second sequence
        #[arg(long)]
        second: String,

        /// Window size in points; omit for full-sequence DTW
        #[arg(long)]
        window: Option<usize>,

        /// Point distance: "euclidean" or "manhattan"
        #[arg(long, default_value = "euclidean")]
        metric: String,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct RunOutput {
    data: PathBuf,
    output: PathBuf,
    metric: String,
    window: Option<usize>,
    n_sequences: usize,
    pairs_total: usize,
    rows_written: usize,
    cancelled: bool,
    skipped: Vec<SkippedOutput>,
    workers: Vec<WorkerOutput>,
}

#[derive(Serialize)]
struct SkippedOutput {
    i: usize,
    j: usize,
    key1: String,
    key2: String,
    reason: String,
}

#[derive(Serialize)]
struct WorkerOutput {
    worker: usize,
    start: usize,
    end: usize,
    rows_written: usize,
    skipped: usize,
    cancelled: bool,
}

#[derive(Serialize)]
struct AlignOutput {
    first: String,
    second: String,
    metric: String,
    cost: f64,
    path: Vec<[usize; 2]>,
}

#[derive(Serialize)]
struct WindowOutput {
    first: String,
    second: String,
    metric: String,
    window: usize,
    cost: f64,
    range1: String,
    range2: String,
    start1: usize,
    start2: usize,
}

/// Point metric selected on the command line.
#[derive(Clone, Copy)]
enum MetricChoice {
    Euclidean,
    Manhattan,
}

fn parse_metric(s: &str) -> Result<MetricChoice> {
    match s {
        "euclidean" => Ok(MetricChoice::Euclidean),
        "manhattan" => Ok(MetricChoice::Manhattan),
        other => anyhow::bail!("unknown metric: {other} (expected euclidean or manhattan)"),
    }
}

fn parse_partition(s: &str) -> Result<Range<usize>> {
    let (start, end) = s
        .split_once("..")
        .with_context(|| format!("partition {s:?} is not of the form start..end"))?;
    let start: usize = start
        .trim()
        .parse()
        .with_context(|| format!("invalid partition start in {s:?}"))?;
    let end: usize = end
        .trim()
        .parse()
        .with_context(|| format!("invalid partition end in {s:?}"))?;
    Ok(start..end)
}

fn load(data: &Path) -> Result<Dataset> {
    DatasetReader::new(data)
        .read()
        .with_context(|| format!("failed to load {}", data.display()))
}

fn summarize(summary: BatchSummary) -> (Vec<SkippedOutput>, Vec<WorkerOutput>) {
    let skipped = summary
        .skipped
        .into_iter()
        .map(|s| SkippedOutput {
            i: s.i,
            j: s.j,
            key1: s.key1.to_string(),
            key2: s.key2.to_string(),
            reason: s.reason.to_string(),
        })
        .collect();
    let workers = summary
        .workers
        .into_iter()
        .map(|w| WorkerOutput {
            worker: w.worker,
            start: w.range.start,
            end: w.range.end,
            rows_written: w.rows_written,
            skipped: w.skipped,
            cancelled: w.cancelled,
        })
        .collect();
    (skipped, workers)
}

fn run_batch<M: PointMetric>(
    config: BatchConfig<M>,
    dataset: &Dataset,
    output: &Path,
    retries: usize,
) -> Result<BatchSummary> {
    let sink = CsvResultSink::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?
        .with_retries(retries);
    BatchRunner::new(config)
        .run(dataset, &sink, &CancelFlag::new())
        .context("batch run failed")
}

fn align_pair<M: PointMetric>(
    dtw: Dtw<M>,
    dataset: &Dataset,
    first: &str,
    second: &str,
    window: Option<usize>,
    metric: &str,
) -> Result<String> {
    let lookup = |key: &str| {
        dataset
            .position(key)
            .and_then(|idx| dataset.get(idx))
            .map(|(_, seq)| seq)
            .with_context(|| format!("no sequence with key {key:?}"))
    };
    let seq1 = lookup(first)?;
    let seq2 = lookup(second)?;

    let json = match window {
        None => {
            let alignment = dtw
                .align(seq1.points(), seq2.points())
                .context("alignment failed")?;
            info!(cost = %alignment.cost, steps = alignment.path.len(), "pair aligned");
            serde_json::to_string_pretty(&AlignOutput {
                first: first.to_string(),
                second: second.to_string(),
                metric: metric.to_string(),
                cost: alignment.cost.value(),
                path: alignment.path.forward().map(|s| [s.a, s.b]).collect(),
            })?
        }
        Some(w) => {
            let found = WindowedMatcher::new(w, dtw)
                .and_then(|matcher| matcher.best_match(seq1, seq2))
                .context("windowed match failed")?;
            info!(cost = %found.cost, start1 = found.start1, start2 = found.start2, "window matched");
            serde_json::to_string_pretty(&WindowOutput {
                first: first.to_string(),
                second: second.to_string(),
                metric: metric.to_string(),
                window: w,
                cost: found.cost.value(),
                range1: found.range1.to_string(),
                range2: found.range2.to_string(),
                start1: found.start1,
                start2: found.start2,
            })?
        }
    };
    Ok(json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run {
            data,
            output,
            window,
            workers,
            partition,
            metric,
            retries,
        } => {
            let metric_choice = parse_metric(&metric)?;
            let dataset = load(&data)?;

            let partitioning = if partition.is_empty() {
                Partitioning::Even(workers)
            } else {
                Partitioning::Explicit(partition)
            };
            let mut config = BatchConfig::new()
                .with_partitioning(partitioning)
                .context("invalid worker partitioning")?;
            if let Some(w) = window {
                config = config.with_window(w).context("invalid window")?;
            }

            let summary = match metric_choice {
                MetricChoice::Euclidean => run_batch(config, &dataset, &output, retries)?,
                MetricChoice::Manhattan => {
                    run_batch(config.with_metric(Manhattan), &dataset, &output, retries)?
                }
            };
            info!(
                rows_written = summary.rows_written,
                output = %output.display(),
                "results written"
            );

            let n_sequences = dataset.len();
            let (pairs_total, rows_written, cancelled) =
                (summary.pairs_total, summary.rows_written, summary.cancelled);
            let (skipped, workers) = summarize(summary);
            let output = RunOutput {
                data,
                output,
                metric,
                window,
                n_sequences,
                pairs_total,
                rows_written,
                cancelled,
                skipped,
                workers,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Align {
            data,
            first,
            second,
            window,
            metric,
        } => {
            let metric_choice = parse_metric(&metric)?;
            let dataset = load(&data)?;
            let json = match metric_choice {
                MetricChoice::Euclidean => align_pair(
                    Dtw::with_metric(Euclidean),
                    &dataset,
                    &first,
                    &second,
                    window,
                    &metric,
                )?,
                MetricChoice::Manhattan => align_pair(
                    Dtw::with_metric(Manhattan),
                    &dataset,
                    &first,
                    &second,
                    window,
                    &metric,
                )?,
            };
            println!("{json}");
        }
    }

    Ok(())
}
