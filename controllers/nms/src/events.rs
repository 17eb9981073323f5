//! Trigger intake and dispatch table
//!
//! A trigger is one JSON line: `{"kind": ..., "relation": ..., "state": {...}}`.
//! `dispatch` maps it to the single handler that runs for it; the mapping is a
//! pure function of the trigger so it can be tested without a host.

use crate::error::ControllerError;
use crate::state::{CERTIFICATES_RELATION, ObservedState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    UpdateStatus,
    PebbleReady,
    ConfigChanged,
    RelationJoined,
    RelationChanged,
    RelationBroken,
    CertificateAvailable,
    PebbleCustomNotice,
    CollectStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    /// Relation the trigger is about, for relation triggers
    #[serde(default)]
    pub relation: Option<String>,
    /// Snapshot taken after the change the trigger reports
    #[serde(default)]
    pub state: ObservedState,
}

impl Trigger {
    pub fn parse(line: &str) -> Result<Self, ControllerError> {
        serde_json::from_str(line).map_err(|e| ControllerError::Trigger(format!("{}: {}", e, line)))
    }
}

/// Work performed for a trigger. Status is collected after every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Config phase, authorization and inventory phase
    Configure,
    /// Remove stored TLS artifacts
    CertificatesBroken,
    /// Republish gNB network configuration after the NMS signalled a change
    SyncNetworkConfig,
    /// Status only
    CollectStatus,
}

pub fn dispatch(trigger: &Trigger) -> Handler {
    match (trigger.kind, trigger.relation.as_deref()) {
        (TriggerKind::RelationBroken, Some(CERTIFICATES_RELATION)) => Handler::CertificatesBroken,
        (TriggerKind::PebbleCustomNotice, _) => Handler::SyncNetworkConfig,
        (TriggerKind::CollectStatus, _) => Handler::CollectStatus,
        _ => Handler::Configure,
    }
}
