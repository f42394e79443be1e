use crate::report::ReportCollector;
use crate::OperationRecord;

/// Keeps every operation in memory for the lifetime of the run and logs a tally when the run
/// finishes. Useful while developing scenarios.
#[derive(Debug, Default)]
pub struct InMemoryReporter {
    operation_records: Vec<OperationRecord>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed_count(&self) -> usize {
        self.operation_records
            .iter()
            .filter(|record| record.is_error)
            .count()
    }
}

impl ReportCollector for InMemoryReporter {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        self.operation_records.push(operation_record.clone());
    }

    fn finalize(&self) {
        log::info!(
            "Recorded {} operations, {} failed",
            self.operation_records.len(),
            self.failed_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failed_operations() {
        let mut reporter = InMemoryReporter::new();

        let mut ok = OperationRecord::new("http_get".to_string());
        ok.is_error = false;
        let mut failed = OperationRecord::new("http_get".to_string());
        failed.is_error = true;

        reporter.add_operation(&ok);
        reporter.add_operation(&failed);
        reporter.add_operation(&failed);

        assert_eq!(3, reporter.operation_records.len());
        assert_eq!(2, reporter.failed_count());
    }
}
