//! Observed state snapshot
//!
//! Every trigger carries a full snapshot of what the host knows: leadership,
//! charm config, every joined relation with both application databags, the TLS
//! certificate currently assigned to the unit and the addresses the workload is
//! reachable on. Handlers read only from this snapshot.

use relations::{Databag, DatabaseRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

pub const COMMON_DATABASE_RELATION: &str = "common_database";
pub const AUTH_DATABASE_RELATION: &str = "auth_database";
pub const CERTIFICATES_RELATION: &str = "certificates";
pub const FIVEG_N4_RELATION: &str = "fiveg_n4";
pub const FIVEG_CORE_GNB_RELATION: &str = "fiveg_core_gnb";
pub const FIVEG_GNB_IDENTITY_RELATION: &str = "fiveg_gnb_identity";
pub const SDCORE_CONFIG_RELATION: &str = "sdcore_config";

/// Relations without which the workload cannot be configured
pub const MANDATORY_RELATIONS: [&str; 3] = [
    COMMON_DATABASE_RELATION,
    AUTH_DATABASE_RELATION,
    CERTIFICATES_RELATION,
];

/// Port the NMS API and UI listen on
pub const NMS_PORT: u16 = 5000;

const VALID_LOG_LEVELS: [&str; 6] = ["debug", "info", "warn", "error", "fatal", "panic"];

/// One joined relation instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationInstance {
    pub id: u64,
    /// Remote application name, absent while the remote side is departing
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub remote_app_data: Databag,
    #[serde(default)]
    pub local_app_data: Databag,
}

/// Certificate, CA and private key currently assigned to the unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBundle {
    pub certificate: String,
    pub ca: String,
    pub private_key: String,
}

/// Charm configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmConfig {
    #[serde(rename = "log-level", default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl CharmConfig {
    /// Names of the options whose value is not accepted
    pub fn invalid_configs(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            invalid.push("log-level");
        }
        invalid
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    #[serde(default)]
    pub leader: bool,
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub config: CharmConfig,
    /// Joined relations grouped by relation name
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<RelationInstance>>,
    #[serde(default)]
    pub certificate: Option<CertificateBundle>,
    #[serde(default)]
    pub ingress_url: Option<String>,
    #[serde(default)]
    pub pod_ip: Option<String>,
}

impl ObservedState {
    /// Instances of one relation, in ascending relation id
    pub fn relations(&self, name: &str) -> Vec<&RelationInstance> {
        let mut instances: Vec<&RelationInstance> = self
            .relations
            .get(name)
            .map(|list| list.iter().collect())
            .unwrap_or_default();
        instances.sort_by_key(|r| r.id);
        instances
    }

    pub fn relation_created(&self, name: &str) -> bool {
        self.relations.get(name).is_some_and(|list| !list.is_empty())
    }

    /// Credentials of the first instance of a database relation, once populated
    pub fn database(&self, name: &str) -> Option<DatabaseRecord> {
        let relation = self.relations(name).into_iter().next()?;
        DatabaseRecord::from_databag(&relation.remote_app_data).ok()
    }

    /// Address the NMS UI is reached on: the ingress host when one is
    /// published, otherwise the pod IP on the NMS port
    pub fn endpoint(&self) -> String {
        if let Some(ingress_url) = self.ingress_url.as_deref() {
            match reqwest::Url::parse(ingress_url) {
                Ok(url) => {
                    if let Some(host) = url.host_str() {
                        return match url.port() {
                            Some(port) => format!("{}:{}", host, port),
                            None => host.to_string(),
                        };
                    }
                }
                Err(e) => info!("Error parsing the ingress URL: {}", e),
            }
        }
        format!("{}:{}", self.pod_ip.as_deref().unwrap_or("localhost"), NMS_PORT)
    }
}
