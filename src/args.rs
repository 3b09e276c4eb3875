use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

/// Convert video files to .mp4 using FFmpeg.
#[derive(Debug, Parser)]
#[command(name = "mediaconv", version)]
pub struct Args {
    /// Directory containing the video files to convert
    pub input_dir: PathBuf,

    /// Directory where converted files and the run log are written
    pub output_dir: PathBuf,

    /// Mirror log entries to the console as they are written
    #[arg(short = 'c', long = "console")]
    pub console: bool,
}

impl Args {
    /// Verify that both directories exist before any work begins.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.exists() {
            bail!("Input directory does not exist: {}", self.input_dir.display());
        }
        if !self.input_dir.is_dir() {
            bail!("Input path is not a directory: {}", self.input_dir.display());
        }
        if !self.output_dir.exists() {
            bail!(
                "Output directory does not exist: {}",
                self.output_dir.display()
            );
        }
        if !self.output_dir.is_dir() {
            bail!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            );
        }
        Ok(())
    }
}
