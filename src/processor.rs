use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::ConvertConfig;
use crate::ffmpeg::Encoder;
use crate::runlog::{format_duration, format_size, RunLog};
use crate::runner::{ProcessRunner, SystemRunner};
use crate::scanner::scan_directory;

#[derive(Debug, Default)]
pub struct RunStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub original_total: u64,
    pub converted_total: u64,
}

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum RunOutcome {
    /// All jobs were attempted and the log was written.
    Completed { log_path: PathBuf, stats: RunStats },
    /// No matching files in the input directory; no log file is produced.
    NothingToDo,
}

/// Wires the stages of one run: scan, convert each job in sequence, log.
///
/// Conversions are strictly sequential; the processor blocks on each encoder
/// invocation before starting the next. Individual failures are logged and the
/// run continues. Only a missing encoder binary unwinds out of the loop.
pub struct Processor<R: ProcessRunner> {
    input_dir: PathBuf,
    output_dir: PathBuf,
    config: ConvertConfig,
    encoder: Encoder<R>,
}

impl Processor<SystemRunner> {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, config: ConvertConfig) -> Self {
        let encoder = Encoder::new(config.clone());
        Self {
            input_dir,
            output_dir,
            config,
            encoder,
        }
    }
}

impl<R: ProcessRunner> Processor<R> {
    pub fn with_runner(
        input_dir: PathBuf,
        output_dir: PathBuf,
        config: ConvertConfig,
        runner: R,
    ) -> Self {
        let encoder = Encoder::with_runner(config.clone(), runner);
        Self {
            input_dir,
            output_dir,
            config,
            encoder,
        }
    }

    pub fn run(&self, console: bool) -> Result<RunOutcome> {
        println!("Scanning directory: {}", self.input_dir.display());

        let jobs = scan_directory(&self.input_dir, &self.output_dir, &self.config)?;
        if jobs.is_empty() {
            return Ok(RunOutcome::NothingToDo);
        }
        println!("Found {} files to convert", jobs.len());

        self.encoder
            .validate()
            .context("Encoder is not available")?;

        let mut log = RunLog::new(console);
        let mut stats = RunStats::default();

        for job in &jobs {
            if !console {
                println!("Converting: {}", job.source_name());
            }

            let result = self.encoder.convert(job)?;

            stats.attempted += 1;
            stats.original_total += result.source_size;
            if result.succeeded {
                stats.succeeded += 1;
                stats.converted_total += result.dest_size.unwrap_or(0);
            } else {
                stats.failed += 1;
            }

            log.record(&result);
        }

        log.summarize(
            stats.attempted,
            stats.succeeded,
            stats.failed,
            stats.original_total,
            stats.converted_total,
        );

        let log_path = log.write_to(&self.output_dir)?;
        let elapsed = chrono::Local::now()
            .signed_duration_since(log.started_at())
            .to_std()
            .unwrap_or_default();

        self.print_summary(&stats, elapsed);

        Ok(RunOutcome::Completed { log_path, stats })
    }

    fn print_summary(&self, stats: &RunStats, elapsed: std::time::Duration) {
        println!();
        println!("=== CONVERSION COMPLETE ===");
        println!("Attempted: {}", stats.attempted);
        println!("Succeeded: {}", stats.succeeded);
        println!("Failed: {}", stats.failed);
        println!("Elapsed time: {}", format_duration(elapsed));
        println!(
            "Original total file size: {}",
            format_size(stats.original_total)
        );
        println!(
            "Converted total file size: {}",
            format_size(stats.converted_total)
        );
    }
}
