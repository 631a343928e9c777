//! External decoder invocation (e.g. `jpeg2png`).
//!
//! The decoder is an opaque program called as `<program> [args..] <raw> -o<processed>`.
//! Exit code 0 means success; anything else makes the resolver fall back to the raw file.

use crate::config::DecoderConfig;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of one decoder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderOutcome {
    Success,
    /// Exited non-zero. `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// Did not finish within the configured timeout and was killed.
    TimedOut,
    /// Could not be started (not found, not executable, ...).
    SpawnFailed(String),
}

impl DecoderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecoderOutcome::Success)
    }
}

/// Enhancement step turning the raw file into the processed file.
pub trait Enhance {
    fn enhance(&self, raw: &Path, processed: &Path) -> DecoderOutcome;
}

#[derive(Debug, Clone)]
pub struct ExternalDecoder {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl ExternalDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            working_dir: None,
        }
    }

    pub fn from_config(cfg: &DecoderConfig) -> Self {
        Self {
            program: PathBuf::from(&cfg.program),
            args: cfg.args.clone(),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            working_dir: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for one run.
    pub fn command_args(&self, raw: &Path, processed: &Path) -> Vec<OsString> {
        let mut out: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        out.push(raw.as_os_str().to_owned());
        let mut flag = OsString::from("-o");
        flag.push(processed.as_os_str());
        out.push(flag);
        out
    }

    /// True if the program can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .and_then(|mut child| {
                let _ = child.kill();
                child.wait()
            })
            .is_ok()
    }

    fn wait(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        let Some(limit) = self.timeout else {
            return child.wait().map(Some);
        };
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Enhance for ExternalDecoder {
    fn enhance(&self, raw: &Path, processed: &Path) -> DecoderOutcome {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(raw, processed))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(program = %self.program.display(), "decoder spawn failed: {}", e);
                return DecoderOutcome::SpawnFailed(e.to_string());
            }
        };

        // Drain stderr off-thread so a chatty decoder can't block on a full pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut s = String::new();
                let _ = pipe.read_to_string(&mut s);
                s
            })
        });

        let status = self.wait(&mut child);
        // After a timeout, grandchildren may still hold the pipe open; don't wait on them.
        let stderr = match (&status, stderr) {
            (Ok(Some(_)), Some(h)) => h.join().unwrap_or_default(),
            _ => String::new(),
        };
        let stderr = stderr.trim();

        match status {
            Ok(Some(status)) if status.success() => {
                tracing::debug!(program = %self.program.display(), "decoder succeeded");
                DecoderOutcome::Success
            }
            Ok(Some(status)) => {
                tracing::warn!(
                    program = %self.program.display(),
                    code = ?status.code(),
                    stderr,
                    "decoder failed"
                );
                DecoderOutcome::Failed {
                    code: status.code(),
                }
            }
            Ok(None) => {
                tracing::warn!(program = %self.program.display(), timeout = ?self.timeout, "decoder timed out");
                DecoderOutcome::TimedOut
            }
            Err(e) => {
                tracing::warn!(program = %self.program.display(), "decoder wait failed: {}", e);
                DecoderOutcome::Failed { code: None }
            }
        }
    }
}
