//! gNB and UPF inventory synchronization
//!
//! Desired inventory is re-derived from the joined relations on every pass and
//! diffed against what the NMS lists. gNBs are matched by name only and are
//! never updated; UPFs are matched by hostname and updated when the port differs.

use super::Reconciler;
use crate::reconcile_helpers::{SyncPlan, plan_sync};
use crate::state::{
    FIVEG_CORE_GNB_RELATION, FIVEG_GNB_IDENTITY_RELATION, FIVEG_N4_RELATION, ObservedState,
};
use nms_client::{GnodeB, NmsClientTrait, Upf};
use relations::{CoreGnbRequirerData, GnbIdentity, N4Endpoint};
use tracing::{debug, info};

/// One remote inventory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryAction {
    CreateGnb { name: String, tac: Option<u32> },
    DeleteGnb { name: String },
    CreateUpf { hostname: String, port: u16 },
    UpdateUpf { hostname: String, port: u16 },
    DeleteUpf { hostname: String },
}

/// gNBs requested by fiveg_core_gnb and fiveg_gnb_identity relations.
/// A name present on both keeps the identity relation's TAC.
pub fn desired_gnbs(state: &ObservedState) -> Vec<GnodeB> {
    let mut gnbs = Vec::new();
    for relation in state.relations(FIVEG_CORE_GNB_RELATION) {
        match CoreGnbRequirerData::from_databag(&relation.remote_app_data) {
            Ok(data) => gnbs.push(GnodeB::new(data.gnb_name, None)),
            Err(e) => debug!("Ignoring {}:{}: {}", FIVEG_CORE_GNB_RELATION, relation.id, e),
        }
    }
    for relation in state.relations(FIVEG_GNB_IDENTITY_RELATION) {
        match GnbIdentity::from_databag(&relation.remote_app_data) {
            Ok(identity) => gnbs.push(GnodeB::new(identity.gnb_name, Some(identity.tac))),
            Err(e) => debug!("Ignoring {}:{}: {}", FIVEG_GNB_IDENTITY_RELATION, relation.id, e),
        }
    }
    gnbs
}

/// UPFs advertised on fiveg_n4 relations
pub fn desired_upfs(state: &ObservedState) -> Vec<Upf> {
    state
        .relations(FIVEG_N4_RELATION)
        .into_iter()
        .filter_map(|relation| match N4Endpoint::from_databag(&relation.remote_app_data) {
            Ok(endpoint) => Some(Upf::new(endpoint.upf_hostname, endpoint.upf_port)),
            Err(e) => {
                debug!("Ignoring {}:{}: {}", FIVEG_N4_RELATION, relation.id, e);
                None
            }
        })
        .collect()
}

/// A renamed gNB is a delete of the old name followed by a create of the new one
pub fn plan_gnb_sync(desired: &[GnodeB], actual: &[GnodeB]) -> Vec<InventoryAction> {
    let plan = plan_sync(desired, actual, |g| g.name.clone(), |_, _| false);
    let deletes = plan
        .delete
        .into_iter()
        .map(|g| InventoryAction::DeleteGnb { name: g.name });
    let creates = plan.create.into_iter().map(|g| InventoryAction::CreateGnb {
        name: g.name,
        tac: g.tac,
    });
    deletes.chain(creates).collect()
}

pub fn plan_upf_sync(desired: &[Upf], actual: &[Upf]) -> Vec<InventoryAction> {
    let plan: SyncPlan<Upf> =
        plan_sync(desired, actual, |u| u.hostname.clone(), |d, a| d.port != a.port);
    let deletes = plan
        .delete
        .into_iter()
        .map(|u| InventoryAction::DeleteUpf { hostname: u.hostname });
    let creates = plan.create.into_iter().map(|u| InventoryAction::CreateUpf {
        hostname: u.hostname,
        port: u.port,
    });
    let updates = plan.update.into_iter().map(|u| InventoryAction::UpdateUpf {
        hostname: u.hostname,
        port: u.port,
    });
    deletes.chain(creates).chain(updates).collect()
}

/// Issue every action in order. The client logs its own failures, so one
/// failing action never stops the rest.
pub async fn execute(nms: &dyn NmsClientTrait, actions: &[InventoryAction], token: &str) {
    for action in actions {
        match action {
            InventoryAction::CreateGnb { name, tac } => nms.create_gnb(name, *tac, token).await,
            InventoryAction::DeleteGnb { name } => nms.delete_gnb(name, token).await,
            InventoryAction::CreateUpf { hostname, port } => {
                nms.create_upf(hostname, *port, token).await
            }
            InventoryAction::UpdateUpf { hostname, port } => {
                nms.update_upf(hostname, *port, token).await
            }
            InventoryAction::DeleteUpf { hostname } => nms.delete_upf(hostname, token).await,
        }
    }
}

impl Reconciler {
    pub(crate) async fn sync_gnbs(
        &self,
        state: &ObservedState,
        nms: &dyn NmsClientTrait,
        token: &str,
    ) {
        let actual = nms.list_gnbs(token).await;
        let actions = plan_gnb_sync(&desired_gnbs(state), &actual);
        if actions.is_empty() {
            debug!("gNB inventory up to date");
            return;
        }
        info!("Applying {} gNB inventory change(s)", actions.len());
        execute(nms, &actions, token).await;
    }

    pub(crate) async fn sync_upfs(
        &self,
        state: &ObservedState,
        nms: &dyn NmsClientTrait,
        token: &str,
    ) {
        let actual = nms.list_upfs(token).await;
        let actions = plan_upf_sync(&desired_upfs(state), &actual);
        if actions.is_empty() {
            debug!("UPF inventory up to date");
            return;
        }
        info!("Applying {} UPF inventory change(s)", actions.len());
        execute(nms, &actions, token).await;
    }
}
