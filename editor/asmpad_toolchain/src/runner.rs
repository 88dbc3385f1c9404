//! The pipeline runner: cleanup → assemble → link → execute.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::ToolchainConfig;
use crate::error::ToolchainError;

/// How often the execute stage checks the child and the cancel token.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One external-process stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Assemble,
    Link,
    Execute,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assemble => "assemble",
            Self::Link => "link",
            Self::Execute => "execute",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured output of one completed stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub stdout: String,
    pub stderr: String,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Standard output of the executed program.
    pub stdout: String,
    /// Captured output of every stage, in pipeline order. Assembler and
    /// linker chatter is retained even on success so the host can offer it
    /// as verbose diagnostics.
    pub reports: Vec<StageReport>,
}

impl RunOutput {
    #[must_use]
    pub fn report(&self, stage: Stage) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }
}

/// Outcome of waiting on the executed program.
enum Waited {
    Exited(ExitStatus),
    Cancelled,
}

/// Runs the assemble → link → execute pipeline, one run at a time.
///
/// The runner is synchronous: `run` blocks until the pipeline finishes. A
/// host that wants a responsive UI offloads the call to a background task
/// and cancels it through a [`CancelToken`]. A second run while one is in
/// flight is rejected with [`ToolchainError::Busy`].
pub struct Runner {
    config: ToolchainConfig,
    in_flight: AtomicBool,
}

impl Runner {
    #[must_use]
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Best-effort removal of stale artifacts from an earlier run.
    ///
    /// Never fails: absent files, permissions, and every other error are
    /// swallowed. This is the pipeline's cleanup stage and is also applied
    /// when an execution is cancelled.
    pub fn clean(&self, source: &Path) {
        for path in [
            self.config.object_path(source),
            self.config.executable_path(source),
        ] {
            if std::fs::remove_file(&path).is_ok() {
                tracing::debug!(path = %path.display(), "removed stale artifact");
            }
        }
    }

    /// Run the full pipeline for `source`.
    ///
    /// `None` means the document has never been saved: the run fails with
    /// [`ToolchainError::NoSourceFile`] before any process is spawned.
    ///
    /// # Errors
    ///
    /// See [`ToolchainError`]; a failure at any stage skips the remaining
    /// stages.
    pub fn run(&self, source: Option<&Path>) -> Result<RunOutput, ToolchainError> {
        self.run_cancellable(source, &CancelToken::new())
    }

    /// [`run`](Runner::run) with cooperative cancellation of the execute
    /// stage.
    ///
    /// # Errors
    ///
    /// As [`run`](Runner::run); additionally, a triggered token yields
    /// [`ToolchainError::Failed`] for stage `execute` with the diagnostic
    /// `cancelled`, after the child is killed and artifacts are cleaned.
    pub fn run_cancellable(
        &self,
        source: Option<&Path>,
        cancel: &CancelToken,
    ) -> Result<RunOutput, ToolchainError> {
        // An unsaved document fails before the guard and before any spawn.
        let source = source.ok_or(ToolchainError::NoSourceFile)?;
        let _guard = self.acquire()?;
        let source = absolutize(source)?;

        self.clean(&source);

        let mut reports = Vec::with_capacity(3);
        reports.push(self.run_tool(Stage::Assemble, self.config.assemble_command(&source))?);
        reports.push(self.run_tool(Stage::Link, self.config.link_command(&source))?);

        let report = self.execute(&source, cancel)?;
        let stdout = report.stdout.clone();
        reports.push(report);
        Ok(RunOutput { stdout, reports })
    }

    /// Reserve the runner for one run; the guard releases it on drop.
    fn acquire(&self) -> Result<FlightGuard<'_>, ToolchainError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ToolchainError::Busy);
        }
        Ok(FlightGuard {
            flag: &self.in_flight,
        })
    }

    /// Run an assembler/linker stage to completion with captured output.
    fn run_tool(&self, stage: Stage, mut cmd: Command) -> Result<StageReport, ToolchainError> {
        let rendered = format!("{cmd:?}");
        tracing::debug!(stage = stage.as_str(), command = %rendered, "running stage");
        let output = cmd
            .output()
            .map_err(|e| launch_error(stage, &cmd, &e))?;
        stage_report(
            stage,
            &rendered,
            output.status,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )
    }

    /// Run the produced executable, polling the cancel token while it lives.
    ///
    /// Both pipes are drained on background threads so a chatty program
    /// cannot fill a pipe buffer and stall against the poll loop.
    fn execute(
        &self,
        source: &Path,
        cancel: &CancelToken,
    ) -> Result<StageReport, ToolchainError> {
        let mut cmd = self.config.execute_command(source);
        let rendered = format!("{cmd:?}");
        tracing::debug!(stage = "execute", command = %rendered, "running stage");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd
            .spawn()
            .map_err(|e| launch_error(Stage::Execute, &cmd, &e))?;

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let waited = loop {
            if cancel.is_cancelled() {
                break Ok(Waited::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break Ok(Waited::Exited(status)),
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => break Err(e),
            }
        };

        // Kill before joining the readers: a live child holds the write
        // ends of the pipes open and the join would block on it.
        if !matches!(waited, Ok(Waited::Exited(_))) {
            let _ = child.kill();
            let _ = child.wait();
        }
        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        match waited {
            Ok(Waited::Exited(status)) => {
                stage_report(Stage::Execute, &rendered, status, stdout, stderr)
            }
            Ok(Waited::Cancelled) => {
                tracing::debug!(source = %source.display(), "execute stage cancelled");
                self.clean(source);
                Err(ToolchainError::Failed {
                    stage: Stage::Execute,
                    exit_code: None,
                    diagnostic: "cancelled".to_string(),
                    command: rendered,
                })
            }
            Err(e) => Err(ToolchainError::Io {
                message: e.to_string(),
            }),
        }
    }
}

/// Releases the in-flight flag when a run ends, on every exit path.
#[derive(Debug)]
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Map a spawn failure: missing/non-executable tools are launch errors
/// (there is no exit code), everything else is plain I/O.
fn launch_error(stage: Stage, cmd: &Command, e: &std::io::Error) -> ToolchainError {
    use std::io::ErrorKind;
    if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) {
        ToolchainError::Launch {
            stage,
            program: cmd.get_program().to_string_lossy().into_owned(),
            message: e.to_string(),
        }
    } else {
        ToolchainError::Io {
            message: e.to_string(),
        }
    }
}

/// Fold a finished process into a report, or a stage failure on non-zero
/// exit.
fn stage_report(
    stage: Stage,
    command: &str,
    status: ExitStatus,
    stdout: String,
    stderr: String,
) -> Result<StageReport, ToolchainError> {
    if status.success() {
        Ok(StageReport {
            stage,
            stdout,
            stderr,
        })
    } else {
        Err(ToolchainError::Failed {
            stage,
            exit_code: status.code(),
            diagnostic: failure_diagnostic(&stdout, &stderr),
            command: command.to_string(),
        })
    }
}

/// Stderr is the diagnostic; captured stdout is attached beneath it when
/// non-empty so assembler listings and program output are not lost.
fn failure_diagnostic(stdout: &str, stderr: &str) -> String {
    let mut diagnostic = stderr.trim_end().to_string();
    if !stdout.trim().is_empty() {
        if !diagnostic.is_empty() {
            diagnostic.push_str("\n\n");
        }
        diagnostic.push_str("Captured stdout:\n");
        diagnostic.push_str(stdout.trim_end());
    }
    diagnostic
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Resolve a relative source path against the process working directory so
/// derived artifact paths stay valid after the stages change directory.
fn absolutize(source: &Path) -> Result<PathBuf, ToolchainError> {
    if source.is_absolute() {
        Ok(source.to_path_buf())
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(source))
            .map_err(|e| ToolchainError::Io {
                message: e.to_string(),
            })
    }
}
