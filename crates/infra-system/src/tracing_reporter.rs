// Reporter implementation on top of tracing
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error, warn};

use cmdharness_core::domain::Report;
use cmdharness_core::port::Reporter;

/// Logs TBROK at error level and TWARN at warn level
///
/// Messages already embed "at FILE:LINE", so the location is not repeated
/// as a separate field.
///
/// `fatal` runs the cleanup callback after logging and then returns; the
/// runner turns the failure into an `Err` for the caller.
#[derive(Debug, Default)]
pub struct TracingReporter {
    fatal_count: AtomicUsize,
    warning_count: AtomicUsize,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal_count.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }
}

impl Reporter for TracingReporter {
    fn fatal(&self, report: &Report, cleanup: Option<&dyn Fn()>) {
        self.fatal_count.fetch_add(1, Ordering::Relaxed);

        error!(
            kind = %report.kind,
            code = report.kind.code(),
            os_error = ?report.os_error,
            "{}", report.message
        );

        if let Some(cleanup) = cleanup {
            debug!("Running cleanup callback");
            cleanup();
        }
    }

    fn warning(&self, report: &Report) {
        self.warning_count.fetch_add(1, Ordering::Relaxed);

        warn!(
            kind = %report.kind,
            code = report.kind.code(),
            os_error = ?report.os_error,
            "{}", report.message
        );
    }
}
