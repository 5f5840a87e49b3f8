// Port Layer - Interfaces for external dependencies

pub mod process_spawner;
pub mod reporter;

// Re-exports
pub use process_spawner::{ChildPid, ProcessSpawner, SpawnError, WaitOutcome};
pub use reporter::Reporter;
