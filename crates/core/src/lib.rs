// cmdharness Core - Command runner, domain types & ports
// NO process spawning backend, NO logging backend (hexagonal layout)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use application::CommandRunner;
pub use config::RunnerConfig;
pub use domain::{Argv, ChildExit, Redirect, Report, ReportKind, SourceLocation};
pub use error::{Result, RunError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
