//! Reconciliation logic for the NMS workload.
//!
//! Every trigger is handled from scratch against its state snapshot:
//! - `configure`: config phase (TLS artifacts, config file, service plan)
//! - `authorization`: admin account bootstrap and session token
//! - `inventory`: gNB/UPF diff against the NMS inventory
//! - `network_config`: TAC/PLMN publication on fiveg_core_gnb relations
//! - `status`: unit status and workload version
//!
//! Only a relation-data write attempted by a non-leader escapes a pass as an
//! error. Every other failure is logged and the affected phase is skipped.

pub mod authorization;
pub mod configure;
pub mod inventory;
pub mod network_config;
pub mod status;

use crate::certificates::CertificateStore;
use crate::error::ControllerError;
use crate::events::{Handler, Trigger, dispatch};
use crate::secrets::SecretStore;
use crate::sink::{EventSink, OutwardRecord};
use crate::state::ObservedState;
use crate::workload::Workload;
use nms_client::{NmsClientTrait, NmsError};
use relations::Databag;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Builds an NMS client trusting the given PEM CA (or any certificate when `None`)
pub type NmsClientFactory =
    Box<dyn Fn(Option<&str>) -> Result<Arc<dyn NmsClientTrait>, NmsError> + Send + Sync>;

/// Reconciles the NMS workload and inventory.
pub struct Reconciler {
    pub(crate) workload: Arc<dyn Workload>,
    pub(crate) secrets: Arc<dyn SecretStore>,
    pub(crate) sink: Arc<dyn EventSink>,
    nms_factory: NmsClientFactory,
}

impl Reconciler {
    pub fn new(
        workload: Arc<dyn Workload>,
        secrets: Arc<dyn SecretStore>,
        sink: Arc<dyn EventSink>,
        nms_factory: NmsClientFactory,
    ) -> Self {
        Self {
            workload,
            secrets,
            sink,
            nms_factory,
        }
    }

    /// Run the handler the trigger dispatches to, then collect status
    pub async fn handle(&self, trigger: &Trigger) -> Result<(), ControllerError> {
        let state = &trigger.state;
        let handler = dispatch(trigger);
        info!(
            "Handling {:?} trigger{} with {:?}",
            trigger.kind,
            trigger.relation.as_deref().map(|r| format!(" on {}", r)).unwrap_or_default(),
            handler
        );

        // TLS artifacts live in this unit's own storage, so removal needs no leadership
        if !state.leader && matches!(handler, Handler::Configure | Handler::SyncNetworkConfig) {
            debug!("Unit is not leader, skipping {:?}", handler);
        } else {
            let result = match handler {
                Handler::Configure => self.configure(state).await,
                Handler::CertificatesBroken => self.remove_certificates().await,
                Handler::SyncNetworkConfig => self.sync_network_config_on_notice(state).await,
                Handler::CollectStatus => Ok(()),
            };
            Self::contain(result)?;
        }

        Self::contain(self.collect_status(state).await)
    }

    /// Let `NotLeader` through, log anything else
    fn contain(result: Result<(), ControllerError>) -> Result<(), ControllerError> {
        match result {
            Err(e @ ControllerError::NotLeader(_)) => Err(e),
            Err(e) => {
                error!("Reconciliation failed: {}", e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn remove_certificates(&self) -> Result<(), ControllerError> {
        if !self.workload.can_connect().await {
            info!("Container not reachable, TLS artifacts will be removed on a later trigger");
            return Ok(());
        }
        CertificateStore::new(self.workload.as_ref()).clean_up().await
    }

    /// NMS client for this pass, trusting the CA stored in the workload
    pub(crate) async fn nms_client(&self) -> Option<Arc<dyn NmsClientTrait>> {
        let ca = if self.workload.can_connect().await {
            CertificateStore::new(self.workload.as_ref()).ca_certificate().await
        } else {
            None
        };
        match (self.nms_factory)(ca.as_deref()) {
            Ok(client) => Some(client),
            Err(e) => {
                error!("Failed to create NMS client: {}", e);
                None
            }
        }
    }

    /// Write this application's data on one relation instance. Only the leader may do so.
    pub(crate) fn publish_app_data(
        &self,
        state: &ObservedState,
        relation: &str,
        relation_id: u64,
        data: Databag,
    ) -> Result<(), ControllerError> {
        if !state.leader {
            return Err(ControllerError::NotLeader(format!("{}:{}", relation, relation_id)));
        }
        self.sink.emit(OutwardRecord::RelationData {
            relation: relation.to_string(),
            relation_id,
            data,
        })?;
        info!("Published application data on {}:{}", relation, relation_id);
        Ok(())
    }
}

/// Whether `current` already carries every key of `wanted` with the same value
pub(crate) fn already_published(current: &Databag, wanted: &Databag) -> bool {
    wanted.iter().all(|(k, v)| current.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::{CA_CERTIFICATE_PATH, CERTIFICATE_PATH, PRIVATE_KEY_PATH};
    use crate::events::TriggerKind;
    use crate::state::{CERTIFICATES_RELATION, FIVEG_CORE_GNB_RELATION};
    use crate::status::UnitStatus;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_publish_requires_leadership() {
        let harness = Harness::new();
        let state = StateBuilder::new().leader(false).build();
        let result = harness
            .reconciler
            .publish_app_data(&state, FIVEG_CORE_GNB_RELATION, 1, Databag::new());
        assert!(matches!(result, Err(ControllerError::NotLeader(_))));
        assert!(harness.sink.relation_writes().is_empty());
    }

    #[tokio::test]
    async fn test_non_leader_only_collects_status() {
        let harness = Harness::new();
        let state = StateBuilder::new()
            .leader(false)
            .common_database()
            .auth_database()
            .certificates()
            .build();
        harness
            .reconciler
            .handle(&trigger(TriggerKind::ConfigChanged, None, state))
            .await
            .unwrap();

        assert!(harness.workload.writes().is_empty());
        assert!(harness.nms.calls().is_empty());
        assert_eq!(
            harness.sink.last_status(),
            Some(UnitStatus::Blocked("Scaling is not implemented for this charm".to_string()))
        );
    }

    #[tokio::test]
    async fn test_certificates_broken_removes_artifacts() {
        let harness = Harness::new();
        harness.workload.put(CERTIFICATE_PATH, "C1");
        harness.workload.put(CA_CERTIFICATE_PATH, "CA");

        let state = StateBuilder::new().leader(true).build();
        harness
            .reconciler
            .handle(&trigger(TriggerKind::RelationBroken, Some(CERTIFICATES_RELATION), state))
            .await
            .unwrap();

        assert!(harness.workload.file(CERTIFICATE_PATH).is_none());
        assert!(harness.workload.file(CA_CERTIFICATE_PATH).is_none());
        assert!(harness.sink.last_status().is_some());
    }

    #[tokio::test]
    async fn test_certificates_broken_on_non_leader_removes_artifacts() {
        let harness = Harness::new();
        harness.workload.put(CERTIFICATE_PATH, "C1");
        harness.workload.put(PRIVATE_KEY_PATH, "K1");
        harness.workload.put(CA_CERTIFICATE_PATH, "CA");

        let state = StateBuilder::new().leader(false).build();
        harness
            .reconciler
            .handle(&trigger(TriggerKind::RelationBroken, Some(CERTIFICATES_RELATION), state))
            .await
            .unwrap();

        assert!(harness.workload.file(CERTIFICATE_PATH).is_none());
        assert!(harness.workload.file(PRIVATE_KEY_PATH).is_none());
        assert!(harness.workload.file(CA_CERTIFICATE_PATH).is_none());
        assert!(harness.nms.calls().is_empty());
        assert_eq!(
            harness.sink.last_status(),
            Some(UnitStatus::Blocked("Scaling is not implemented for this charm".to_string()))
        );
    }

    #[tokio::test]
    async fn test_certificates_broken_waits_for_container() {
        let harness = Harness::new();
        harness.workload.put(CERTIFICATE_PATH, "C1");
        harness.workload.set_connected(false);

        let state = StateBuilder::new().leader(true).build();
        harness
            .reconciler
            .handle(&trigger(TriggerKind::RelationBroken, Some(CERTIFICATES_RELATION), state))
            .await
            .unwrap();

        assert_eq!(harness.workload.file(CERTIFICATE_PATH).as_deref(), Some("C1"));
    }

    #[tokio::test]
    async fn test_nms_client_trusts_stored_ca() {
        let harness = Harness::new();
        harness.reconciler.nms_client().await.unwrap();
        harness.workload.put(CA_CERTIFICATE_PATH, "CA-PEM");
        harness.reconciler.nms_client().await.unwrap();
        assert_eq!(harness.ca_seen(), vec![None, Some("CA-PEM".to_string())]);
    }

    #[test]
    fn test_already_published() {
        let current = Databag::from([
            ("tac".to_string(), "1".to_string()),
            ("extra".to_string(), "x".to_string()),
        ]);
        let same = Databag::from([("tac".to_string(), "1".to_string())]);
        let other = Databag::from([("tac".to_string(), "2".to_string())]);
        assert!(already_published(&current, &same));
        assert!(!already_published(&current, &other));
        assert!(!already_published(&Databag::new(), &same));
    }
}
