use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ConvertConfig;

/// One source-file-to-destination-file conversion task.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    /// Source extension as found on disk.
    pub extension: String,
}

impl ConversionJob {
    /// Source file name for display and logging.
    pub fn source_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Destination file name for display and logging.
    pub fn dest_name(&self) -> String {
        self.dest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan the input directory for convertible files.
///
/// Enumerates direct entries only (non-recursive) and emits one job per file
/// whose extension matches the configured set, case-insensitively. Everything
/// else is skipped without comment. Job order follows directory listing order,
/// which is platform-dependent.
pub fn scan_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &ConvertConfig,
) -> Result<Vec<ConversionJob>> {
    let mut jobs = Vec::new();

    for entry_result in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                if let Some(path) = err.path() {
                    eprintln!("Warning: Failed to access {}: {}", path.display(), err);
                } else {
                    eprintln!("Warning: WalkDir error: {}", err);
                }
                continue;
            }
        };

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_string(),
            None => continue,
        };

        if !config.is_supported(&extension) {
            continue;
        }

        let dest_path = destination_path(path, output_dir, config);

        jobs.push(ConversionJob {
            source_path: path.to_path_buf(),
            dest_path,
            extension,
        });
    }

    Ok(jobs)
}

/// Derive the destination path for a source file.
///
/// The source stem has spaces replaced with underscores, gets the configured
/// suffix appended, and takes the target container extension. An existing file
/// at that path is overwritten by the encoder on the next run.
fn destination_path(source: &Path, output_dir: &Path, config: &ConvertConfig) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .replace(' ', "_");

    output_dir.join(format!(
        "{}{}.{}",
        stem, config.dest_suffix, config.target_extension
    ))
}
