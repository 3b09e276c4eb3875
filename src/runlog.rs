use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ffmpeg::ConversionResult;

/// Accumulates log entries for one run and flushes them to a timestamped file.
///
/// Entries are buffered in memory and written out once, at finalization, to
/// `conversion_log_<run-start>.log` in the output directory. The run-start
/// stamp keeps concurrent runs from colliding on the same file. With console
/// mirroring enabled each entry is also printed as it arrives.
pub struct RunLog {
    started_at: DateTime<Local>,
    entries: Vec<String>,
    console: bool,
}

impl RunLog {
    pub fn new(console: bool) -> Self {
        let mut log = Self {
            started_at: Local::now(),
            entries: Vec::new(),
            console,
        };
        log.info("Conversion log");
        log.info("==============================================");
        log
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Append one timestamped INFO entry.
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.push("INFO", message.as_ref());
    }

    /// Append one timestamped ERROR entry.
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.push("ERROR", message.as_ref());
    }

    fn push(&mut self, level: &str, message: &str) {
        let entry = format!(
            "{} - {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        if self.console {
            println!("{}", entry);
        }
        self.entries.push(entry);
    }

    /// Record the outcome of one attempted conversion.
    pub fn record(&mut self, result: &ConversionResult) {
        if result.succeeded {
            let dest_size = result.dest_size.unwrap_or(0);
            self.info(format!(
                "\"{}\" ({}) was converted to \"{}\" ({}) in {}.",
                result.job.source_name(),
                format_size(result.source_size),
                result.job.dest_name(),
                format_size(dest_size),
                format_duration(result.duration),
            ));
        } else {
            let reason = result
                .error_message
                .as_deref()
                .unwrap_or("unknown error");
            self.error(format!(
                "Error converting \"{}\": {}",
                result.job.source_name(),
                reason
            ));
        }
    }

    /// Append the run summary block.
    pub fn summarize(
        &mut self,
        attempted: usize,
        succeeded: usize,
        failed: usize,
        original_total: u64,
        converted_total: u64,
    ) {
        let elapsed = Local::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default();

        self.info("Summary");
        self.info("================================================");
        self.info(format!(
            "Start time: {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        self.info(format!(
            "End time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.info(format!("Elapsed time: {}", format_duration(elapsed)));
        self.info(format!(
            "{} attempted, {} succeeded, {} failed",
            attempted, succeeded, failed
        ));
        self.info(format!(
            "Original total file size: {}",
            format_size(original_total)
        ));
        self.info(format!(
            "Converted total file size: {}",
            format_size(converted_total)
        ));
    }

    /// The log file name for this run.
    pub fn file_name(&self) -> String {
        format!(
            "conversion_log_{}.log",
            self.started_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the buffered entries to the output directory.
    pub fn write_to(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(self.file_name());
        let mut contents = self.entries.join("\n");
        contents.push('\n');
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write log file: {}", path.display()))?;
        Ok(path)
    }
}

/// Format a byte count as a human-readable size (B/KB/MB/GB).
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} GB", size)
}

/// Format a duration as minutes and seconds, e.g. "2m5s".
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}m{}s", total / 60, total % 60)
}
