use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run at the encoder boundary.
///
/// Per-job conversion failures are not errors; they are recorded in the
/// [`ConversionResult`](crate::ffmpeg::ConversionResult) and the run moves on.
/// Only conditions under which no further job could possibly succeed surface
/// here.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The ffmpeg binary could not be launched at all.
    #[error("ffmpeg not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// I/O error while talking to the encoder process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
