mod report;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use report::{InMemoryReporter, ReportCollector, ReportConfig, Reporter};

pub mod prelude {
    pub use crate::report::{InMemoryReporter, ReportCollector, ReportConfig, Reporter};
    pub use crate::{report_operation, OperationRecord};
}

/// A single timed operation, such as one HTTP request made by an agent.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub operation_id: String,
    started: Instant,
    pub elapsed: Option<Duration>,
    pub is_error: bool,
    pub attr: HashMap<String, String>,
}

impl OperationRecord {
    pub fn new(operation_id: String) -> Self {
        Self {
            operation_id,
            started: Instant::now(),
            elapsed: None,
            is_error: false,
            attr: HashMap::new(),
        }
    }

    /// Attach an attribute, for example the path that was requested.
    pub fn add_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attr.insert(key.into(), value.into());
    }

    /// The time the operation took, available once it has been reported.
    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// Complete an operation record using the outcome of the operation and hand it to the reporter.
pub fn report_operation<T, E>(
    reporter: Arc<Reporter>,
    mut operation_record: OperationRecord,
    response: &Result<T, E>,
) {
    operation_record.elapsed = Some(operation_record.started.elapsed());
    operation_record.is_error = response.is_err();

    reporter.add_operation(&operation_record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Capture {
        records: Arc<Mutex<Vec<OperationRecord>>>,
    }

    impl ReportCollector for Capture {
        fn add_operation(&mut self, operation_record: &OperationRecord) {
            self.records.lock().push(operation_record.clone());
        }

        fn finalize(&self) {}
    }

    #[test]
    fn report_operation_marks_outcome() {
        let capture = Capture::default();
        let records = capture.records.clone();
        let reporter = Arc::new(ReportConfig::default().with_collector(capture).init());

        let ok: anyhow::Result<()> = Ok(());
        let mut record = OperationRecord::new("http_get".to_string());
        record.add_attr("path", "/");
        report_operation(reporter.clone(), record, &ok);
        let failed: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        report_operation(
            reporter,
            OperationRecord::new("http_get".to_string()),
            &failed,
        );

        let records = records.lock();
        assert_eq!(2, records.len());
        assert!(!records[0].is_error);
        assert!(records[0].duration().is_some());
        assert_eq!(Some(&"/".to_string()), records[0].attr.get("path"));
        assert!(records[1].is_error);
    }
}
