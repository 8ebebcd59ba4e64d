//! Human-readable rendering of per-file outcomes and run summaries.

use std::io::Write;
use std::time::Duration;

use bulkcrypt_core::stream::{FileReport, Job, JobObserver, JobReport};
use humansize::{format_size, BINARY};

/// Prints one line per finished file as reports arrive.
pub struct CliObserver<W: Write> {
    out: W,
}

impl<W: Write> CliObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> JobObserver for CliObserver<W> {
    fn on_job_started(&mut self, job: &Job, workers: usize) {
        let _ = writeln!(
            self.out,
            "{} {} file(s) with {} using {} worker(s)...",
            job.mode(),
            job.files().len(),
            job.algorithm(),
            workers
        );
    }

    fn on_file_completed(&mut self, report: &FileReport) {
        // Output errors here are not worth aborting the run for.
        let _ = writeln!(self.out, "{}", file_line(report));
    }
}

/// `* Thread <rank>: <source> -> <dir>/<name>` on success, a `!` line naming
/// the failure kind otherwise.
pub fn file_line(report: &FileReport) -> String {
    match &report.result {
        Ok(_) => format!(
            "* Thread {}: {} -> {}",
            report.rank,
            report.source_name(),
            report.display_destination().unwrap_or_default()
        ),
        Err(e) => format!(
            "! Thread {}: {} failed ({}): {}",
            report.rank,
            report.source.display(),
            e.kind(),
            e
        ),
    }
}

pub fn print_summary<W: Write>(out: &mut W, report: &JobReport, json: bool) -> std::io::Result<()> {
    let counters = &report.snapshot.counters;
    writeln!(out)?;
    writeln!(out, "Mode: {}", report.mode)?;
    writeln!(out, "Algorithm: {}", report.algorithm)?;
    writeln!(out, "Output directory: {}", report.output_dir_name)?;
    writeln!(
        out,
        "Files: {} succeeded, {} failed ({} in, {} out)",
        counters.files_ok,
        counters.files_failed,
        format_size(counters.bytes_in, BINARY),
        format_size(counters.bytes_out, BINARY)
    )?;
    writeln!(out, "Finished in {}", format_duration(report.snapshot.elapsed))?;
    writeln!(out, "Stage times: {}", report.snapshot.stage_times.summary())?;

    if json {
        let rendered = report.snapshot.to_json().map_err(std::io::Error::other)?;
        writeln!(out, "{rendered}")?;
    }
    Ok(())
}

fn format_duration(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1_000 {
        format!("{ms} ms")
    } else {
        format!("{:.2} s", elapsed.as_secs_f64())
    }
}
