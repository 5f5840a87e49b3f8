// Domain Layer - Argument vectors, redirects, exit statuses, reports

pub mod argv;
pub mod error;
pub mod exit;
pub mod redirect;
pub mod report;

// Re-exports
pub use argv::Argv;
pub use error::DomainError;
pub use exit::ChildExit;
pub use redirect::Redirect;
pub use report::{errno_of, Report, ReportKind, SourceLocation};
