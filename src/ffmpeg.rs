use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::ConvertConfig;
use crate::error::EncodeError;
use crate::runner::{ProcessRunner, SystemRunner};
use crate::scanner::ConversionJob;

/// Outcome of one attempted conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub job: ConversionJob,
    pub succeeded: bool,
    pub duration: Duration,
    /// Captured encoder stderr or launch error text when the job failed.
    pub error_message: Option<String>,
    /// Size of the source file in bytes.
    pub source_size: u64,
    /// Size of the converted file in bytes, when one was produced.
    pub dest_size: Option<u64>,
}

/// Drives ffmpeg (and ffprobe) for individual jobs.
///
/// A job that fails to convert is not an error: the failure is folded into the
/// returned [`ConversionResult`] and the caller moves on to the next job. The
/// only `Err` out of [`convert`](Encoder::convert) is the encoder binary being
/// missing entirely, after which no job can succeed.
pub struct Encoder<R: ProcessRunner> {
    config: ConvertConfig,
    runner: R,
}

impl Encoder<SystemRunner> {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            runner: SystemRunner,
        }
    }
}

impl<R: ProcessRunner> Encoder<R> {
    pub fn with_runner(config: ConvertConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Check that ffmpeg can be launched at all.
    pub fn validate(&self) -> Result<(), EncodeError> {
        match self
            .runner
            .run(&self.config.ffmpeg_path, &[OsString::from("-version")])
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EncodeError::EncoderNotFound {
                path: self.config.ffmpeg_path.clone(),
            }),
            Err(e) => Err(EncodeError::Io(e)),
        }
    }

    /// Convert one job, timing the encoder invocation.
    pub fn convert(&self, job: &ConversionJob) -> Result<ConversionResult, EncodeError> {
        let start = Instant::now();

        let source_size = match fs::metadata(&job.source_path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return Ok(failed(job, start.elapsed(), 0, format!(
                    "Failed to read source file: {}",
                    e
                )));
            }
        };

        if self.config.probe_before_convert {
            if let Some(reason) = self.probe_rejection(&job.source_path) {
                return Ok(failed(job, start.elapsed(), source_size, reason));
            }
        }

        let args = self.build_args(job);
        let output = match self.runner.run(&self.config.ffmpeg_path, &args) {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EncodeError::EncoderNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            Err(e) => {
                return Ok(failed(job, start.elapsed(), source_size, format!(
                    "Failed to launch encoder: {}",
                    e
                )));
            }
        };
        let duration = start.elapsed();

        if !output.success() {
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("ffmpeg exited with code {:?}", output.status)
            } else {
                stderr.to_string()
            };
            return Ok(failed(job, duration, source_size, message));
        }

        let dest_size = match fs::metadata(&job.dest_path) {
            Ok(meta) => meta.len(),
            Err(_) => {
                return Ok(failed(
                    job,
                    duration,
                    source_size,
                    "Output file was not created".to_string(),
                ));
            }
        };

        Ok(ConversionResult {
            job: job.clone(),
            succeeded: true,
            duration,
            error_message: None,
            source_size,
            dest_size: Some(dest_size),
        })
    }

    fn build_args(&self, job: &ConversionJob) -> Vec<OsString> {
        vec![
            // Overwrite an existing destination from a previous run
            OsString::from("-y"),
            OsString::from("-hide_banner"),
            OsString::from("-i"),
            job.source_path.as_os_str().to_os_string(),
            OsString::from("-q:v"),
            OsString::from("0"),
            job.dest_path.as_os_str().to_os_string(),
        ]
    }

    /// Probe the source with ffprobe and return a rejection reason, if any.
    ///
    /// The check is best-effort: when ffprobe itself cannot be launched the
    /// file is let through and ffmpeg gets the final say.
    fn probe_rejection(&self, source: &Path) -> Option<String> {
        let args = vec![
            OsString::from("-v"),
            OsString::from("error"),
            OsString::from("-print_format"),
            OsString::from("json"),
            OsString::from("-show_streams"),
            source.as_os_str().to_os_string(),
        ];

        let output = match self.runner.run(&self.config.ffprobe_path, &args) {
            Ok(output) => output,
            Err(_) => return None,
        };

        if !output.success() {
            let stderr = output.stderr.trim();
            let reason = if stderr.is_empty() {
                "ffprobe could not read the file".to_string()
            } else {
                stderr.to_string()
            };
            return Some(reason);
        }

        match has_video_stream(&output.stdout) {
            Ok(true) => None,
            Ok(false) => Some("No video stream found in source file".to_string()),
            Err(reason) => Some(reason),
        }
    }
}

fn failed(
    job: &ConversionJob,
    duration: Duration,
    source_size: u64,
    message: String,
) -> ConversionResult {
    ConversionResult {
        job: job.clone(),
        succeeded: false,
        duration,
        error_message: Some(message),
        source_size,
        dest_size: None,
    }
}

fn has_video_stream(probe_json: &str) -> Result<bool, String> {
    #[derive(Deserialize)]
    struct ProbeOutput {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    #[derive(Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
    }

    let probe: ProbeOutput = serde_json::from_str(probe_json)
        .map_err(|e| format!("Failed to parse ffprobe output: {}", e))?;

    Ok(probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunOutput;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Scripted runner: dispatches on program name and records invocations.
    struct FnRunner<F: Fn(&Path, &[OsString]) -> io::Result<RunOutput>> {
        behavior: F,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl<F: Fn(&Path, &[OsString]) -> io::Result<RunOutput>> FnRunner<F> {
        fn new(behavior: F) -> Self {
            Self {
                behavior,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn invoked(&self, program: &str) -> bool {
            self.calls
                .borrow()
                .iter()
                .any(|p| p == Path::new(program))
        }
    }

    impl<F: Fn(&Path, &[OsString]) -> io::Result<RunOutput>> ProcessRunner for FnRunner<F> {
        fn run(&self, program: &Path, args: &[OsString]) -> io::Result<RunOutput> {
            self.calls.borrow_mut().push(program.to_path_buf());
            (self.behavior)(program, args)
        }
    }

    fn ok_output(stdout: &str) -> RunOutput {
        RunOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn video_probe_json() -> &'static str {
        r#"{"streams": [{"codec_type": "video", "codec_name": "h264"}, {"codec_type": "audio"}]}"#
    }

    fn make_job(input_dir: &Path, output_dir: &Path, name: &str) -> ConversionJob {
        let source_path = input_dir.join(name);
        fs::write(&source_path, b"fake video content").unwrap();
        ConversionJob {
            source_path,
            dest_path: output_dir.join("out_converted.mp4"),
            extension: "avi".to_string(),
        }
    }

    #[test]
    fn test_build_args_overwrite_and_quality() {
        let encoder = Encoder::new(ConvertConfig::default());
        let job = ConversionJob {
            source_path: PathBuf::from("/in/a.avi"),
            dest_path: PathBuf::from("/out/a_converted.mp4"),
            extension: "avi".to_string(),
        };

        let args = encoder.build_args(&job);
        assert_eq!(args[0], OsString::from("-y"));
        assert!(args.contains(&OsString::from("-i")));
        assert!(args.contains(&OsString::from("-q:v")));
        assert_eq!(args.last().unwrap(), &OsString::from("/out/a_converted.mp4"));
    }

    #[test]
    fn test_convert_success() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let job = make_job(input.path(), output.path(), "clip.avi");
        let dest = job.dest_path.clone();

        let runner = FnRunner::new(move |program, _args| {
            if program == Path::new("ffprobe") {
                Ok(ok_output(video_probe_json()))
            } else {
                // ffmpeg writes the destination file
                fs::write(&dest, b"converted").unwrap();
                Ok(ok_output(""))
            }
        });

        let encoder = Encoder::with_runner(ConvertConfig::default(), runner);
        let result = encoder.convert(&job).unwrap();

        assert!(result.succeeded);
        assert!(result.error_message.is_none());
        assert_eq!(result.dest_size, Some(9));
        assert!(result.source_size > 0);
        assert!(job.dest_path.exists());
    }

    #[test]
    fn test_convert_nonzero_exit_is_recorded_not_fatal() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let job = make_job(input.path(), output.path(), "broken.avi");

        let runner = FnRunner::new(|program, _args| {
            if program == Path::new("ffprobe") {
                Ok(ok_output(video_probe_json()))
            } else {
                Ok(RunOutput {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: "Invalid data found when processing input".to_string(),
                })
            }
        });

        let encoder = Encoder::with_runner(ConvertConfig::default(), runner);
        let result = encoder.convert(&job).unwrap();

        assert!(!result.succeeded);
        let message = result.error_message.unwrap();
        assert!(message.contains("Invalid data"));
        assert!(result.dest_size.is_none());
    }

    #[test]
    fn test_convert_missing_encoder_is_fatal() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let mut config = ConvertConfig::default();
        config.probe_before_convert = false;
        let job = make_job(input.path(), output.path(), "clip.avi");

        let runner = FnRunner::new(|_program, _args| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        });

        let encoder = Encoder::with_runner(config, runner);
        let err = encoder.convert(&job).unwrap_err();
        assert!(matches!(err, EncodeError::EncoderNotFound { .. }));
    }

    #[test]
    fn test_probe_rejection_skips_encoder() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let job = make_job(input.path(), output.path(), "audio_only.avi");

        let runner = FnRunner::new(|program, _args| {
            assert_eq!(program, Path::new("ffprobe"));
            Ok(ok_output(r#"{"streams": [{"codec_type": "audio"}]}"#))
        });

        let encoder = Encoder::with_runner(ConvertConfig::default(), runner);
        let result = encoder.convert(&job).unwrap();

        assert!(!result.succeeded);
        assert!(result
            .error_message
            .unwrap()
            .contains("No video stream"));
        assert!(!encoder.runner.invoked("ffmpeg"));
    }

    #[test]
    fn test_probe_unavailable_falls_through_to_encoder() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let job = make_job(input.path(), output.path(), "clip.avi");
        let dest = job.dest_path.clone();

        let runner = FnRunner::new(move |program, _args| {
            if program == Path::new("ffprobe") {
                Err(io::Error::new(io::ErrorKind::NotFound, "no ffprobe"))
            } else {
                fs::write(&dest, b"converted").unwrap();
                Ok(ok_output(""))
            }
        });

        let encoder = Encoder::with_runner(ConvertConfig::default(), runner);
        let result = encoder.convert(&job).unwrap();

        assert!(result.succeeded);
        assert!(encoder.runner.invoked("ffmpeg"));
    }

    #[test]
    fn test_validate_missing_encoder() {
        let runner = FnRunner::new(|_program, _args| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        });
        let encoder = Encoder::with_runner(ConvertConfig::default(), runner);
        assert!(matches!(
            encoder.validate(),
            Err(EncodeError::EncoderNotFound { .. })
        ));
    }

    #[test]
    fn test_has_video_stream() {
        assert!(has_video_stream(video_probe_json()).unwrap());
        assert!(!has_video_stream(r#"{"streams": [{"codec_type": "audio"}]}"#).unwrap());
        assert!(!has_video_stream(r#"{"streams": []}"#).unwrap());
        assert!(!has_video_stream("{}").unwrap());
        assert!(has_video_stream("not json").is_err());
    }
}
