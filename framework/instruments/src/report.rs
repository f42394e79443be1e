mod in_memory_reporter;

use crate::OperationRecord;
use parking_lot::Mutex;

pub use in_memory_reporter::InMemoryReporter;

/// A sink for completed operations.
pub trait ReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord);

    /// Called once when the scenario has finished.
    fn finalize(&self);
}

/// Choose which collectors the [Reporter] forwards operations to.
#[derive(Default)]
pub struct ReportConfig {
    in_memory: bool,
    custom: Vec<Box<dyn ReportCollector + Send>>,
}

impl ReportConfig {
    pub fn enable_in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn with_collector(mut self, collector: impl ReportCollector + Send + 'static) -> Self {
        self.custom.push(Box::new(collector));
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors = self.custom;
        if self.in_memory {
            collectors.push(Box::new(InMemoryReporter::new()));
        }

        Reporter {
            collectors: Mutex::new(collectors),
        }
    }
}

/// Shared handle that agents report operations through. With no collectors configured, reports
/// are dropped.
pub struct Reporter {
    collectors: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn add_operation(&self, operation_record: &OperationRecord) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_operation(operation_record);
        }
    }

    pub fn finalize(&self) {
        for collector in self.collectors.lock().iter() {
            collector.finalize();
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("collectors", &self.collectors.lock().len())
            .finish()
    }
}
