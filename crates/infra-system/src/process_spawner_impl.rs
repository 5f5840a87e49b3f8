// Process spawner implementation
// reason: std::process::Command for PATH lookup + exec, nix for waitpid on one pid
use std::io;
use std::process::{Command, Stdio};

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use tracing::debug;

use cmdharness_core::domain::{Argv, ChildExit, Redirect};
use cmdharness_core::port::{ChildPid, ProcessSpawner, SpawnError, WaitOutcome};

/// Spawns children with std::process::Command and reaps them with waitpid
///
/// Redirect descriptors are duplicated into the Command and land on fd 1/2
/// before exec; the duplicates are closed in the parent once spawn returns.
/// The caller's own descriptors are never touched.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessSpawner;

impl StdProcessSpawner {
    pub fn new() -> Self {
        Self
    }

    fn stdio_for(redirect: Redirect<'_>) -> io::Result<Stdio> {
        match redirect {
            Redirect::Inherit => Ok(Stdio::inherit()),
            Redirect::Fd(fd) => Ok(Stdio::from(fd.try_clone_to_owned()?)),
        }
    }
}

/// Spawn errors that mean "the program could not be executed"
///
/// Only OS errors qualify. Errors without an errno (a NUL byte in an
/// argument) are rejected by std before any exec is attempted.
fn is_exec_error(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error().map(Errno::from_raw),
        Some(
            Errno::ENOENT
                | Errno::EACCES
                | Errno::EPERM
                | Errno::ENOEXEC
                | Errno::ENOTDIR
                | Errno::ELOOP
                | Errno::ENAMETOOLONG
                | Errno::E2BIG
                | Errno::ETXTBSY
        )
    )
}

fn unexpected_status(status: WaitStatus) -> SpawnError {
    SpawnError::Wait(io::Error::new(
        io::ErrorKind::Other,
        format!("unexpected wait status: {:?}", status),
    ))
}

fn decode(status: WaitStatus) -> Result<WaitOutcome, SpawnError> {
    let Some(reaped) = status.pid() else {
        return Err(unexpected_status(status));
    };

    let exit = match status {
        WaitStatus::Exited(_, code) => ChildExit::Exited(code),
        WaitStatus::Signaled(_, signal, _) => ChildExit::Signaled(signal as i32),
        WaitStatus::Stopped(_, signal) => ChildExit::Stopped(signal as i32),
        other => return Err(unexpected_status(other)),
    };

    Ok(WaitOutcome {
        pid: reaped.as_raw() as ChildPid,
        exit,
    })
}

impl ProcessSpawner for StdProcessSpawner {
    fn spawn(
        &self,
        argv: &Argv,
        stdout: Redirect<'_>,
        stderr: Redirect<'_>,
    ) -> Result<ChildPid, SpawnError> {
        let stdout = Self::stdio_for(stdout).map_err(SpawnError::Fork)?;
        let stderr = Self::stdio_for(stderr).map_err(SpawnError::Fork)?;

        let child = Command::new(argv.program())
            .args(argv.args())
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| {
                if is_exec_error(&e) {
                    SpawnError::Exec(e)
                } else {
                    SpawnError::Fork(e)
                }
            })?;

        let pid = child.id();
        debug!(pid = pid, program = %argv.program_lossy(), "Child spawned");

        // Reaped through waitpid below, not Child::wait
        Ok(pid)
    }

    fn wait(&self, pid: ChildPid) -> Result<WaitOutcome, SpawnError> {
        let raw = i32::try_from(pid)
            .map_err(|_| SpawnError::Wait(io::Error::from(Errno::EINVAL)))?;

        loop {
            match waitpid(Pid::from_raw(raw), None) {
                Ok(status) => {
                    debug!(pid = pid, status = ?status, "Child reaped");
                    return decode(status);
                }
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(SpawnError::Wait(io::Error::from(errno))),
            }
        }
    }
}
