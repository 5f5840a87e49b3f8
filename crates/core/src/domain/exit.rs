// Child termination status

use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::Signal;

/// How a child process ended
///
/// Only `Exited(0)` counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Normal exit with a status code
    Exited(i32),
    /// Terminated by a signal
    Signaled(i32),
    /// Stopped by a signal (job control)
    Stopped(i32),
    /// Program image could not be replaced (raw errno)
    ExecFailed(i32),
}

impl ChildExit {
    pub fn success(&self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }

    /// Exit code, if the child exited normally
    pub fn code(&self) -> Option<i32> {
        match self {
            ChildExit::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

fn signal_name(signo: i32) -> String {
    Signal::try_from(signo)
        .map(|sig| sig.as_str().to_string())
        .unwrap_or_else(|_| format!("signal {}", signo))
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exited with code {}", code),
            ChildExit::Signaled(signo) => write!(f, "killed by {}", signal_name(*signo)),
            ChildExit::Stopped(signo) => write!(f, "stopped by {}", signal_name(*signo)),
            ChildExit::ExecFailed(errno) => write!(f, "exec failed: {}", Errno::from_raw(*errno)),
        }
    }
}
