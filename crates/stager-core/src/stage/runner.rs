//! Sequential fleet iteration with per-target isolation.

use tracing::info;

use crate::report::FleetReport;
use crate::session::ManagementTransport;
use crate::stage::{StageOptions, TargetProcessor};

/// Runs the per-target processor over a fleet, strictly sequentially and in
/// input order.
///
/// Isolation is a hard guarantee: the processor converts every failure into
/// a result record, so one bad target can never abort the run and the report
/// always contains exactly one row set per input target.
pub struct FleetRunner {
    transport: Box<dyn ManagementTransport>,
    options: StageOptions,
}

impl FleetRunner {
    pub fn new(transport: Box<dyn ManagementTransport>, options: StageOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &StageOptions {
        &self.options
    }

    pub fn run(&self, targets: &[String]) -> FleetReport {
        let processor = TargetProcessor::new(self.transport.as_ref(), &self.options);

        let results = targets
            .iter()
            .map(|address| {
                info!(address = %address, "processing target");
                processor.process(address)
            })
            .collect();

        FleetReport { results }
    }
}
