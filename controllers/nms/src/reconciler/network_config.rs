//! TAC and PLMN publication on fiveg_core_gnb relations
//!
//! Each gNB's configuration is aggregated from the network slices that list
//! it: the first TAC found and every distinct PLMN. A gNB that belongs to no
//! slice keeps whatever was published for it before.

use super::{Reconciler, already_published};
use crate::error::ControllerError;
use crate::state::{FIVEG_CORE_GNB_RELATION, ObservedState};
use nms_client::NmsClientTrait;
use relations::{CoreGnbRequirerData, Databag, GnbConfig, PlmnConfig};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// TAC and PLMNs of one gNB as configured through network slices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceMembership {
    pub tac: Option<u32>,
    pub plmns: Vec<PlmnConfig>,
}

/// Aggregate slice membership per gNB name
pub async fn gnb_memberships(
    nms: &dyn NmsClientTrait,
    token: &str,
) -> BTreeMap<String, SliceMembership> {
    let mut memberships: BTreeMap<String, SliceMembership> = BTreeMap::new();
    for name in nms.list_network_slices(token).await {
        let Some(slice) = nms.get_network_slice(&name, token).await else {
            warn!("Network slice {} could not be read", name);
            continue;
        };
        let plmn = PlmnConfig::new(slice.mcc.clone(), slice.mnc.clone(), slice.sst, slice.sd);
        for gnb in &slice.gnodebs {
            let entry = memberships.entry(gnb.name.clone()).or_default();
            if entry.tac.is_none() {
                entry.tac = gnb.tac;
            }
            if !entry.plmns.contains(&plmn) {
                entry.plmns.push(plmn.clone());
            }
        }
    }
    memberships
}

/// Whether the relation already carries this TAC and PLMN list.
/// PLMNs are compared as parsed JSON so key order does not matter.
fn same_network_config(current: &Databag, wanted: &Databag) -> bool {
    if current.get("tac") != wanted.get("tac") {
        return false;
    }
    let parse = |bag: &Databag| {
        bag.get("plmns")
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
    };
    match (parse(current), parse(wanted)) {
        (Some(current), Some(wanted)) => current == wanted,
        _ => already_published(current, wanted),
    }
}

impl Reconciler {
    /// Republish network configuration after the NMS reported a change
    pub(crate) async fn sync_network_config_on_notice(
        &self,
        state: &ObservedState,
    ) -> Result<(), ControllerError> {
        if !self.workload.can_connect().await {
            debug!("Container not yet reachable, network config not synchronized");
            return Ok(());
        }
        let Some(nms) = self.nms_client().await else {
            return Ok(());
        };
        let Some(token) = self.authorize(nms.as_ref()).await? else {
            warn!("Failed to get admin account details");
            return Ok(());
        };
        self.sync_network_config(state, nms.as_ref(), &token).await
    }

    pub(crate) async fn sync_network_config(
        &self,
        state: &ObservedState,
        nms: &dyn NmsClientTrait,
        token: &str,
    ) -> Result<(), ControllerError> {
        let relations = state.relations(FIVEG_CORE_GNB_RELATION);
        if relations.is_empty() {
            return Ok(());
        }
        let memberships = gnb_memberships(nms, token).await;

        for relation in relations {
            if relation.app.is_none() {
                warn!(
                    "Remote application of {}:{} is not available",
                    FIVEG_CORE_GNB_RELATION, relation.id
                );
                continue;
            }
            let requirer = match CoreGnbRequirerData::from_databag(&relation.remote_app_data) {
                Ok(requirer) => requirer,
                Err(e) => {
                    error!("Invalid data on {}:{}: {}", FIVEG_CORE_GNB_RELATION, relation.id, e);
                    continue;
                }
            };
            let Some(membership) = memberships.get(&requirer.gnb_name) else {
                debug!(
                    "gNB {} is not part of any network slice, keeping its published data",
                    requirer.gnb_name
                );
                continue;
            };
            let Some(tac) = membership.tac else {
                warn!("gNB {} has no TAC assigned", requirer.gnb_name);
                continue;
            };
            let config = GnbConfig {
                tac,
                plmns: membership.plmns.clone(),
            };
            let data = match config.to_databag() {
                Ok(data) => data,
                Err(e) => {
                    error!("Invalid network config for gNB {}: {}", requirer.gnb_name, e);
                    continue;
                }
            };
            if same_network_config(&relation.local_app_data, &data) {
                continue;
            }
            self.publish_app_data(state, FIVEG_CORE_GNB_RELATION, relation.id, data)?;
            info!("Network config published for gNB {}", requirer.gnb_name);
        }
        Ok(())
    }
}
