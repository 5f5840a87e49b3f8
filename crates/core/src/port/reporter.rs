// Reporter Port
// Fatal ("broken") and warning reporting, injected instead of global macros

use crate::domain::Report;

/// Reporter trait
///
/// `fatal` marks the current test as broken and runs `cleanup`. It may
/// return; callers treat the report as the end of the operation either way.
/// `warning` logs and returns.
///
/// Implementations:
/// - TracingReporter (infra-system): logs via tracing
/// - RecordingReporter: captures reports for assertions
pub trait Reporter: Send + Sync {
    fn fatal(&self, report: &Report, cleanup: Option<&dyn Fn()>);

    fn warning(&self, report: &Report);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ReportKind;
    use std::sync::{Arc, Mutex};

    /// Reporter that records every report and runs cleanup on fatal ones
    #[derive(Default)]
    pub struct RecordingReporter {
        reports: Arc<Mutex<Vec<Report>>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn reports(&self) -> Vec<Report> {
            self.reports.lock().unwrap().clone()
        }
        pub fn fatal_reports(&self) -> Vec<Report> {
            self.of_kind(ReportKind::Broken)
        }
        pub fn warnings(&self) -> Vec<Report> {
            self.of_kind(ReportKind::Warn)
        }
        fn of_kind(&self, kind: ReportKind) -> Vec<Report> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.kind == kind)
                .cloned()
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn fatal(&self, report: &Report, cleanup: Option<&dyn Fn()>) {
            self.reports.lock().unwrap().push(report.clone());
            if let Some(cleanup) = cleanup {
                cleanup();
            }
        }

        fn warning(&self, report: &Report) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }
}
