//! Sequential batch loop with progress, stats and summary output.

use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use autotag_core::{
    Detector, DiscoveredFile, MetadataOutcome, OutputWriter, ProcessingStats, Summary,
    TaggedImage,
};

use super::ProcessContext;

/// What a batch run produced.
pub struct BatchReport {
    pub summary: Summary,
    pub stats: ProcessingStats,
    pub elapsed: Duration,
}

/// Process every file in order. Per-image failures are logged and counted;
/// they never stop the batch.
pub async fn process_batch<D: Detector + ?Sized>(
    ctx: &ProcessContext,
    detector: &D,
    files: &[DiscoveredFile],
) -> BatchReport {
    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();

    let mut summary = Summary::new();
    let mut stats = ProcessingStats::default();

    for file in files {
        match ctx.tagger.process(detector, &file.path, &ctx.options).await {
            Ok(tagged) => {
                record_outcome(&mut stats, &tagged);
                if let Some(previous) = summary.record(&tagged.image) {
                    tracing::warn!(
                        "Duplicate filename {}: replacing labels {:?} with those from {}",
                        tagged.image.file_name,
                        previous,
                        file.path.display()
                    );
                }
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed ({}): {} - {e}", e.stage(), file.path.display());
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let done = stats.processed + stats.failed;
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }

    progress.finish_and_clear();

    BatchReport {
        summary,
        stats,
        elapsed: start_time.elapsed(),
    }
}

/// Fold one image's result into the run counters.
fn record_outcome(stats: &mut ProcessingStats, tagged: &TaggedImage) {
    stats.processed += 1;
    if tagged.image.has_labels() {
        stats.tagged += 1;
    }
    match &tagged.metadata {
        MetadataOutcome::Untouched => {}
        MetadataOutcome::Written { .. } => stats.written += 1,
        MetadataOutcome::WrittenWithoutExisting { .. } => {
            stats.written += 1;
            stats.read_errors += 1;
        }
        MetadataOutcome::WriteFailed { read_error, .. } => {
            stats.write_errors += 1;
            if read_error.is_some() {
                stats.read_errors += 1;
            }
        }
    }
}

/// Write the summary JSON to `output`, or stdout when no file is given.
pub fn write_summary(summary: &Summary, output: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = OutputWriter::new(BufWriter::new(file), pretty);
            writer.write(summary)?;
            writer.flush()?;
            tracing::info!("Output written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), pretty);
            writer.write(summary)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    // Log lines and the bar share stderr; skip the bar when it isn't a terminal
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
pub fn print_summary(stats: &ProcessingStats, elapsed: Duration) {
    let total = stats.processed + stats.failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Processed:    {:>8}", stats.processed);
    eprintln!("    Tagged:       {:>8}", stats.tagged);
    eprintln!("    Written:      {:>8}", stats.written);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.read_errors > 0 {
        eprintln!("    Read errors:  {:>8}", stats.read_errors);
    }
    if stats.write_errors > 0 {
        eprintln!("    Write errors: {:>8}", stats.write_errors);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
