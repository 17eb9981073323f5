//! Config phase
//!
//! Gates, TLS artifacts, config file and service plan, followed by the
//! authorization and inventory phases once the NMS can be talked to.

use super::{Reconciler, already_published};
use crate::certificates::CertificateStore;
use crate::config_file::{ConfigInputs, NMS_CONFIG_PATH, render, write_if_changed};
use crate::error::ControllerError;
use crate::state::{MANDATORY_RELATIONS, ObservedState, SDCORE_CONFIG_RELATION};
use crate::workload::{ServicePlan, storage_attached};
use relations::SdcoreConfig;
use tracing::{debug, info, warn};

impl Reconciler {
    /// Full pass for every trigger that is not handled more specifically
    pub(crate) async fn configure(&self, state: &ObservedState) -> Result<(), ControllerError> {
        if !self.ready_to_configure(state).await {
            return Ok(());
        }
        let Some(inputs) = ConfigInputs::from_state(state) else {
            debug!("Database credentials not yet available");
            return Ok(());
        };
        if !CertificateStore::is_available(state.certificate.as_ref()) {
            debug!("Waiting for certificates to be available");
            return Ok(());
        }

        self.configure_workload(state, &inputs).await?;

        let Some(nms) = self.nms_client().await else {
            return Ok(());
        };
        let token = self.authorize(nms.as_ref()).await?;
        self.publish_sdcore_config(state).await?;

        let Some(token) = token else {
            warn!("Failed to get admin account details");
            return Ok(());
        };
        self.sync_gnbs(state, nms.as_ref(), &token).await;
        self.sync_upfs(state, nms.as_ref(), &token).await;
        self.sync_network_config(state, nms.as_ref(), &token).await
    }

    async fn ready_to_configure(&self, state: &ObservedState) -> bool {
        if !self.workload.can_connect().await {
            debug!("Container not yet reachable");
            return false;
        }
        if !state.config.invalid_configs().is_empty() {
            debug!("Invalid charm configuration");
            return false;
        }
        if !storage_attached(self.workload.as_ref()).await {
            debug!("Storage not yet attached");
            return false;
        }
        if let Some(missing) = MANDATORY_RELATIONS.iter().find(|r| !state.relation_created(r)) {
            debug!("Relation {} not yet created", missing);
            return false;
        }
        true
    }

    /// Bring TLS artifacts, config file and service plan in line with the snapshot.
    /// The service is restarted when the config file or a TLS artifact changed.
    async fn configure_workload(
        &self,
        state: &ObservedState,
        inputs: &ConfigInputs,
    ) -> Result<(), ControllerError> {
        let certs_changed = CertificateStore::new(self.workload.as_ref())
            .check_and_update(state.certificate.as_ref())
            .await?;
        let config_changed = write_if_changed(self.workload.as_ref(), &render(inputs)?).await?;

        let plan = ServicePlan::nms(NMS_CONFIG_PATH, &inputs.endpoint, &inputs.log_level);
        let plan_applied = self.workload.plan().await.as_ref() != Some(&plan);
        if plan_applied {
            // Applying a plan already restarts the service
            self.workload.apply_plan(plan).await?;
            info!("New layer added to the NMS service plan");
        }

        if (config_changed || certs_changed) && !plan_applied {
            self.workload.restart().await?;
            info!("Restarted NMS service");
        }
        Ok(())
    }

    /// Hand the webui address to every sdcore_config relation once the service runs
    async fn publish_sdcore_config(&self, state: &ObservedState) -> Result<(), ControllerError> {
        if !state.relation_created(SDCORE_CONFIG_RELATION) {
            return Ok(());
        }
        if !self.workload.service_running().await {
            debug!("NMS service not running, sdcore_config not published");
            return Ok(());
        }
        let data = match SdcoreConfig::for_app(&state.app_name).to_databag() {
            Ok(data) => data,
            Err(e) => {
                warn!("Invalid sdcore_config data: {}", e);
                return Ok(());
            }
        };
        for relation in state.relations(SDCORE_CONFIG_RELATION) {
            if already_published(&relation.local_app_data, &data) {
                continue;
            }
            self.publish_app_data(state, SDCORE_CONFIG_RELATION, relation.id, data.clone())?;
        }
        Ok(())
    }
}
