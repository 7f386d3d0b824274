//! Asynchronous subprocess runner with line-oriented output listeners.
//!
//! [`ProcessRunner`] spawns a command in a working directory, streams its stdout and
//! stderr line by line to optional listeners and buffers every line into a
//! [`CommandResult`]. Returning from [`CommandRunner::run`] is the completion signal:
//! every line has been delivered to the listeners by then.
//!
//! A failed launch (executable missing, permission denied) is an `Err` of
//! [`GitDeckError::SpawnFailure`]. A non-zero exit is *not* an error at this layer; it is
//! reported in [`CommandResult::exit_code`] and each bridge operation decides what it means.
//!
//! The [`CommandRunner`] trait is the seam the bridge is generic over, so tests can
//! substitute a scripted runner.

use crate::core::error::{GitDeckError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// One line of output tagged with its stream, kept in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: Stream,
    pub text: String,
}

/// A single command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// The full command line, for logs and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

type LineListener<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Per-stream line callbacks, registered before the process is spawned.
#[derive(Default)]
pub struct OutputListeners<'a> {
    stdout: Option<LineListener<'a>>,
    stderr: Option<LineListener<'a>>,
}

impl<'a> OutputListeners<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stdout(mut self, listener: impl FnMut(&str) + Send + 'a) -> Self {
        self.stdout = Some(Box::new(listener));
        self
    }

    pub fn on_stderr(mut self, listener: impl FnMut(&str) + Send + 'a) -> Self {
        self.stderr = Some(Box::new(listener));
        self
    }

    /// Notify the matching listener. Runner implementations call this once per line.
    pub fn emit(&mut self, stream: Stream, line: &str) {
        let listener = match stream {
            Stream::Stdout => self.stdout.as_mut(),
            Stream::Stderr => self.stderr.as_mut(),
        };
        if let Some(listener) = listener {
            listener(line);
        }
    }
}

/// The outcome of one process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Both streams interleaved in the order lines arrived.
    pub output: Vec<OutputLine>,
    /// `None` when the process was terminated by a signal or killed after a timeout.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    pub fn push(&mut self, stream: Stream, text: impl Into<String>) {
        let text = text.into();
        match stream {
            Stream::Stdout => self.stdout.push(text.clone()),
            Stream::Stderr => self.stderr.push(text.clone()),
        }
        self.output.push(OutputLine { stream, text });
    }

    /// Every line from both streams in arrival order.
    pub fn combined(&self) -> Vec<String> {
        self.output.iter().map(|line| line.text.clone()).collect()
    }

    /// Last line printed on either stream, or an empty string.
    pub fn last_line(&self) -> &str {
        self.output
            .last()
            .map(|line| line.text.as_str())
            .unwrap_or("")
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.join("\n").trim().to_string()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        listeners: OutputListeners<'_>,
    ) -> Result<CommandResult>;

    /// The bound applied to every invocation, if any.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Runs commands as real OS subprocesses on the tokio reactor.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill the process and report `timed_out` if it has not finished in `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn run(
        &self,
        invocation: &Invocation,
        mut listeners: OutputListeners<'_>,
    ) -> Result<CommandResult> {
        log::debug!(
            "Spawning `{}` in {}",
            invocation.display(),
            invocation.cwd.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GitDeckError::spawn_failure(&invocation.program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GitDeckError::MissingOutputPipe {
                program: invocation.program.clone(),
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| GitDeckError::MissingOutputPipe {
                program: invocation.program.clone(),
            })?;

        let mut result = CommandResult::default();
        let pump = pump_lines(stdout, stderr, &mut listeners, &mut result);

        let finished = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pump).await.ok(),
            None => Some(pump.await),
        };

        match finished {
            Some(pumped) => {
                pumped?;
                let status = child.wait().await?;
                result.exit_code = status.code();
            }
            None => {
                log::warn!(
                    "`{}` exceeded {:?}, killing it",
                    invocation.display(),
                    self.timeout
                );
                child.kill().await?;
                result.timed_out = true;
            }
        }

        log::debug!(
            "`{}` finished with {:?} ({} stdout / {} stderr lines)",
            invocation.display(),
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}

/// Splits one pipe into lines as bytes arrive.
///
/// `\n` ends a line on both streams. stderr also breaks on `\r`, which git uses to redraw
/// progress counters in place, and drops the empty pieces that leaves behind. Bytes that
/// are not UTF-8 are replaced rather than failing the whole read.
struct LineSplitter {
    stream: Stream,
    pending: Vec<u8>,
}

impl LineSplitter {
    fn new(stream: Stream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    fn is_break(&self, byte: u8) -> bool {
        byte == b'\n' || (self.stream == Stream::Stderr && byte == b'\r')
    }

    fn feed(
        &mut self,
        bytes: &[u8],
        listeners: &mut OutputListeners<'_>,
        result: &mut CommandResult,
    ) {
        for &byte in bytes {
            if self.is_break(byte) {
                self.flush(listeners, result);
            } else {
                self.pending.push(byte);
            }
        }
    }

    /// Emit whatever is left once the pipe has closed.
    fn finish(&mut self, listeners: &mut OutputListeners<'_>, result: &mut CommandResult) {
        if !self.pending.is_empty() {
            self.flush(listeners, result);
        }
    }

    fn flush(&mut self, listeners: &mut OutputListeners<'_>, result: &mut CommandResult) {
        let mut raw = std::mem::take(&mut self.pending);
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        if self.stream == Stream::Stderr && raw.is_empty() {
            return;
        }

        let text = decode_line(raw, self.stream);
        listeners.emit(self.stream, &text);
        result.push(self.stream, text);
    }
}

fn decode_line(raw: Vec<u8>, stream: Stream) -> String {
    match String::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            let text = String::from_utf8_lossy(e.as_bytes()).into_owned();
            log::warn!("Replaced invalid UTF-8 in {stream:?} line: {text:?}");
            text
        }
    }
}

/// Read both pipes until they close, delivering lines in the order they arrive.
async fn pump_lines<O, E>(
    mut stdout: O,
    mut stderr: E,
    listeners: &mut OutputListeners<'_>,
    result: &mut CommandResult,
) -> Result<()>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_lines = LineSplitter::new(Stream::Stdout);
    let mut err_lines = LineSplitter::new(Stream::Stderr);
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => match read? {
                0 => {
                    out_open = false;
                    out_lines.finish(listeners, result);
                }
                n => out_lines.feed(&out_buf[..n], listeners, result),
            },
            read = stderr.read(&mut err_buf), if err_open => match read? {
                0 => {
                    err_open = false;
                    err_lines.finish(listeners, result);
                }
                n => err_lines.feed(&err_buf[..n], listeners, result),
            },
        }
    }

    Ok(())
}
