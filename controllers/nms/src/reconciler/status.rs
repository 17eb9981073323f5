//! Unit status collection

use super::Reconciler;
use crate::error::ControllerError;
use crate::sink::OutwardRecord;
use crate::state::ObservedState;
use crate::status::{LiveStatusChecks, StatusAggregator};
use crate::workload::workload_version;

impl Reconciler {
    /// Evaluate the unit status and hand it, with the workload version, to the host
    pub async fn collect_status(&self, state: &ObservedState) -> Result<(), ControllerError> {
        if state.leader && self.workload.can_connect().await {
            let version = workload_version(self.workload.as_ref()).await;
            self.sink.emit(OutwardRecord::WorkloadVersion { version })?;
        }

        let nms = self.nms_client().await;
        let checks = LiveStatusChecks {
            workload: self.workload.as_ref(),
            nms: nms.as_deref(),
        };
        let status = StatusAggregator::evaluate(state, &checks).await;
        self.sink.emit(OutwardRecord::UnitStatus { status })
    }
}
