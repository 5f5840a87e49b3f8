// Command Runner - spawn, redirect, wait, escalate
use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, IntoRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Arc;

use nix::errno::Errno;
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::domain::{Argv, ChildExit, DomainError, Redirect, Report, SourceLocation};
use crate::error::{Result, RunError};
use crate::port::{ProcessSpawner, Reporter, SpawnError};

/// Runs external commands synchronously and escalates any failure as TBROK
///
/// Two entry points:
/// - `run_cmd_fds`: caller-managed descriptors (pipes, temp files)
/// - `run_cmd`: capture to file paths, opened in append/create mode
///
/// Every fatal failure is handed to `Reporter::fatal` exactly once and then
/// returned as `Err`. Nothing runs after a fatal report, whether or not
/// the reporter returns.
pub struct CommandRunner {
    spawner: Arc<dyn ProcessSpawner>,
    reporter: Arc<dyn Reporter>,
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, reporter: Arc<dyn Reporter>) -> Self {
        Self::with_config(spawner, reporter, RunnerConfig::default())
    }

    pub fn with_config(
        spawner: Arc<dyn ProcessSpawner>,
        reporter: Arc<dyn Reporter>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            spawner,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `argv` with stdout/stderr redirected to caller-owned descriptors
    ///
    /// # Arguments
    /// * `cleanup` - Passed to the reporter on fatal failure
    /// * `argv` - Program followed by its arguments
    /// * `stdout` / `stderr` - `Redirect::Fd` or `Redirect::Inherit`
    ///
    /// # Errors
    /// - RunError::EmptyArgv before any process is created
    /// - RunError::SpawnFailed / WaitFailed / WaitMismatch on OS failures
    /// - RunError::CommandFailed on non-zero exit, signal, or exec failure
    #[track_caller]
    pub fn run_cmd_fds<S: AsRef<OsStr>>(
        &self,
        cleanup: Option<&dyn Fn()>,
        argv: &[S],
        stdout: Redirect<'_>,
        stderr: Redirect<'_>,
    ) -> Result<()> {
        let location = SourceLocation::caller();
        self.run_fds_at(cleanup, argv, stdout, stderr, location)
    }

    /// Run `argv` with stdout/stderr appended to the given files
    ///
    /// A path that cannot be opened is reported as TWARN and that stream is
    /// inherited instead. Files are closed only after a successful run; a
    /// close failure is also just a TWARN.
    #[track_caller]
    pub fn run_cmd<S: AsRef<OsStr>>(
        &self,
        cleanup: Option<&dyn Fn()>,
        argv: &[S],
        stdout_path: Option<&Path>,
        stderr_path: Option<&Path>,
    ) -> Result<()> {
        let location = SourceLocation::caller();

        let stdout_file = stdout_path.and_then(|path| self.open_capture(path, location));
        let stderr_file = stderr_path.and_then(|path| self.open_capture(path, location));

        self.run_fds_at(
            cleanup,
            argv,
            stdout_file.as_ref().map(|f| f.as_fd()).into(),
            stderr_file.as_ref().map(|f| f.as_fd()).into(),
            location,
        )?;

        if let (Some(file), Some(path)) = (stdout_file, stdout_path) {
            self.close_capture(file, path, location);
        }
        if let (Some(file), Some(path)) = (stderr_file, stderr_path) {
            self.close_capture(file, path, location);
        }

        Ok(())
    }

    fn run_fds_at<S: AsRef<OsStr>>(
        &self,
        cleanup: Option<&dyn Fn()>,
        argv: &[S],
        stdout: Redirect<'_>,
        stderr: Redirect<'_>,
        location: SourceLocation,
    ) -> Result<()> {
        let argv = match Argv::new(argv) {
            Ok(argv) => argv,
            Err(DomainError::EmptyArgv) => {
                return Err(self.escalate(cleanup, RunError::EmptyArgv { location }));
            }
        };
        let program = argv.program_lossy();

        debug!(
            command = %argv,
            stdout_redirected = !stdout.is_inherit(),
            stderr_redirected = !stderr.is_inherit(),
            "Spawning command"
        );

        let pid = match self.spawner.spawn(&argv, stdout, stderr) {
            Ok(pid) => pid,
            Err(err) => return Err(self.escalate(cleanup, spawn_failure(err, program, location))),
        };

        debug!(program = %program, pid = pid, "Waiting for child");

        let outcome = match self.spawner.wait(pid) {
            Ok(outcome) => outcome,
            Err(err) => {
                return Err(self.escalate(
                    cleanup,
                    RunError::WaitFailed {
                        pid,
                        source: err.into_io(),
                        location,
                    },
                ));
            }
        };

        if outcome.pid != pid {
            return Err(self.escalate(
                cleanup,
                RunError::WaitMismatch {
                    expected: pid,
                    actual: outcome.pid,
                    location,
                },
            ));
        }

        if !outcome.exit.success() {
            return Err(self.escalate(
                cleanup,
                RunError::CommandFailed {
                    program,
                    exit: outcome.exit,
                    location,
                },
            ));
        }

        info!(program = %program, pid = pid, "Command completed successfully");
        Ok(())
    }

    /// Report `err` as TBROK and hand it back for returning
    fn escalate(&self, cleanup: Option<&dyn Fn()>, err: RunError) -> RunError {
        self.reporter.fatal(&err.to_report(), cleanup);
        err
    }

    fn open_capture(&self, path: &Path, location: SourceLocation) -> Option<File> {
        let opened = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .mode(self.config.capture_mode)
            .open(path);

        match opened {
            Ok(file) => Some(file),
            Err(e) => {
                let report = Report::warn(
                    format!("open() on {} failed at {}", path.display(), location),
                    location,
                )
                .with_io_error(&e);
                self.reporter.warning(&report);
                None
            }
        }
    }

    fn close_capture(&self, file: File, path: &Path, location: SourceLocation) {
        // Explicit close: File's Drop discards close errors
        let closed = nix::unistd::close(file.into_raw_fd());
        if let Some(report) = close_warning(closed, path, location) {
            self.reporter.warning(&report);
        }
    }
}

/// Map a spawn error to the fatal error it escalates as
///
/// An exec error carrying an errno means the program never ran: same outcome
/// as a child exiting from a failed exec. Anything else, including errors
/// with no errno, is a process-creation failure.
fn spawn_failure(err: SpawnError, program: String, location: SourceLocation) -> RunError {
    match err {
        SpawnError::Exec(source) => match source.raw_os_error() {
            Some(errno) => RunError::CommandFailed {
                program,
                exit: ChildExit::ExecFailed(errno),
                location,
            },
            None => RunError::SpawnFailed {
                program,
                source,
                location,
            },
        },
        other => RunError::SpawnFailed {
            program,
            source: other.into_io(),
            location,
        },
    }
}

/// TWARN for a failed close of a capture file, if the close failed
fn close_warning(
    closed: std::result::Result<(), Errno>,
    path: &Path,
    location: SourceLocation,
) -> Option<Report> {
    let errno = closed.err()?;
    Some(
        Report::warn(
            format!("close() on {} failed at {}", path.display(), location),
            location,
        )
        .with_errno(errno),
    )
}
