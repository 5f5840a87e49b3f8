// Reports handed to the Reporter port (TBROK / TWARN + optional errno)

use std::fmt;
use std::io;
use std::panic::Location;

use nix::errno::Errno;

use crate::application::constants::{TBROK, TWARN};

/// Severity of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Fatal: the current test is broken
    Broken,
    /// Non-fatal: logged, execution continues
    Warn,
}

impl ReportKind {
    /// LTP-compatible result code
    pub fn code(self) -> i32 {
        match self {
            ReportKind::Broken => TBROK,
            ReportKind::Warn => TWARN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Broken => "TBROK",
            ReportKind::Warn => "TWARN",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller source location (file:line), captured via `#[track_caller]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    file: &'static str,
    line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One report: severity, message, optional OS error, source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    pub message: String,
    pub os_error: Option<Errno>,
    pub location: SourceLocation,
}

impl Report {
    pub fn broken(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ReportKind::Broken, message, location)
    }

    pub fn warn(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ReportKind::Warn, message, location)
    }

    fn new(kind: ReportKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            os_error: None,
            location,
        }
    }

    /// Attach the OS error (the "plus errno" modifier)
    pub fn with_errno(mut self, errno: Errno) -> Self {
        self.os_error = Some(errno);
        self
    }

    /// Attach the OS error behind an io::Error, if it has one
    pub fn with_io_error(mut self, err: &io::Error) -> Self {
        self.os_error = errno_of(err);
        self
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(errno) = self.os_error {
            write!(f, ": {}", errno)?;
        }
        Ok(())
    }
}

/// Raw errno of an io::Error, if it came from the OS
pub fn errno_of(err: &io::Error) -> Option<Errno> {
    err.raw_os_error().map(Errno::from_raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ReportKind::Broken.code(), 2);
        assert_eq!(ReportKind::Warn.code(), 4);
    }

    #[test]
    fn test_caller_location_points_here() {
        let location = SourceLocation::caller();
        assert!(location.file().ends_with("report.rs"));
        assert!(location.line() > 0);
        assert_eq!(
            location.to_string(),
            format!("{}:{}", location.file(), location.line())
        );
    }

    #[test]
    fn test_display_includes_errno() {
        let report = Report::warn("open() on /x failed", SourceLocation::caller())
            .with_errno(Errno::ENOENT);
        let text = report.to_string();

        assert!(text.starts_with("TWARN: open() on /x failed"));
        assert!(text.contains("ENOENT"));
    }

    #[test]
    fn test_io_error_without_errno_leaves_none() {
        let err = io::Error::new(io::ErrorKind::Other, "synthetic");
        let report = Report::broken("boom", SourceLocation::caller()).with_io_error(&err);
        assert_eq!(report.os_error, None);
    }
}
