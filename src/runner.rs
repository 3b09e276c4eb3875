use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured outcome of one external process invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Capability to run an external program to completion.
///
/// The encoder talks to ffmpeg and ffprobe exclusively through this seam, so
/// tests can script outcomes without a real binary on the path. A launch
/// failure (program not on the search path, permissions) surfaces as the
/// `io::Error` from spawning; everything else becomes a [`RunOutput`].
pub trait ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<RunOutput>;
}

/// Runs programs as real child processes, blocking until they exit.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<RunOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(RunOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
