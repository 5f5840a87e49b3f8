// Argument vector for a child command

use std::ffi::{OsStr, OsString};
use std::fmt;

use super::error::{DomainError, Result};

/// Argument vector: program name or path, followed by its arguments
///
/// Never empty, so `program()` always has something to return.
/// The program is resolved through `PATH` when it has no slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv {
    args: Vec<OsString>,
}

impl Argv {
    /// Build an argument vector
    ///
    /// # Errors
    /// - DomainError::EmptyArgv if `args` yields nothing
    pub fn new<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();

        if args.is_empty() {
            return Err(DomainError::EmptyArgv);
        }

        Ok(Self { args })
    }

    pub fn program(&self) -> &OsStr {
        &self.args[0]
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[OsString] {
        &self.args[1..]
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.args
    }

    /// Lossy program name, for messages and log fields
    pub fn program_lossy(&self) -> String {
        self.program().to_string_lossy().into_owned()
    }
}

impl fmt::Display for Argv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
