// cmdharness Infrastructure - System Adapters
// Implements: ProcessSpawner, Reporter

pub mod process_spawner_impl;
pub mod tracing_reporter;

pub use process_spawner_impl::StdProcessSpawner;
pub use tracing_reporter::TracingReporter;
