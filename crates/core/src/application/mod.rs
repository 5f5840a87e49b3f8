// Application Layer - Command runner use cases

pub mod command_runner;
pub mod constants;

// Re-exports
pub use command_runner::CommandRunner;
