// Central Error Type for the command runner

use std::io;

use nix::errno::Errno;
use thiserror::Error;

use crate::application::constants::TBROK;
use crate::domain::{errno_of, ChildExit, Report, SourceLocation};
use crate::port::ChildPid;

/// Fatal runner errors
///
/// Every variant is reported as TBROK before it is returned.
#[derive(Error, Debug)]
pub enum RunError {
    /// Usage error: no program given
    #[error("argument list is empty at {location}")]
    EmptyArgv { location: SourceLocation },

    #[error("failed to create process for '{program}' at {location}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
        location: SourceLocation,
    },

    #[error("waitpid failed for pid {pid} at {location}")]
    WaitFailed {
        pid: ChildPid,
        #[source]
        source: io::Error,
        location: SourceLocation,
    },

    #[error("waitpid returned pid {actual}, expected {expected} at {location}")]
    WaitMismatch {
        expected: ChildPid,
        actual: ChildPid,
        location: SourceLocation,
    },

    /// Non-zero exit, abnormal termination, or exec failure
    #[error("failed to exec cmd '{program}' at {location} ({exit})")]
    CommandFailed {
        program: String,
        exit: ChildExit,
        location: SourceLocation,
    },
}

impl RunError {
    /// LTP result code for this error (always TBROK)
    pub fn result_code(&self) -> i32 {
        TBROK
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            RunError::EmptyArgv { location }
            | RunError::SpawnFailed { location, .. }
            | RunError::WaitFailed { location, .. }
            | RunError::WaitMismatch { location, .. }
            | RunError::CommandFailed { location, .. } => *location,
        }
    }

    /// OS error attached to the report, if any
    pub fn os_errno(&self) -> Option<Errno> {
        match self {
            RunError::SpawnFailed { source, .. } | RunError::WaitFailed { source, .. } => {
                errno_of(source)
            }
            RunError::CommandFailed {
                exit: ChildExit::ExecFailed(errno),
                ..
            } => Some(Errno::from_raw(*errno)),
            _ => None,
        }
    }

    /// Build the TBROK report for this error
    pub fn to_report(&self) -> Report {
        let report = Report::broken(self.to_string(), self.location());
        match self.os_errno() {
            Some(errno) => report.with_errno(errno),
            None => report,
        }
    }
}

/// Result type alias using RunError
pub type Result<T> = std::result::Result<T, RunError>;
