//! NMS configuration file
//!
//! The file is rendered from typed structs with `serde_yaml`, so identical
//! inputs always give byte-identical output, and is only written when its
//! content changes.

use crate::certificates::{CERTIFICATE_PATH, PRIVATE_KEY_PATH};
use crate::error::ControllerError;
use crate::state::{AUTH_DATABASE_RELATION, COMMON_DATABASE_RELATION, ObservedState};
use crate::workload::Workload;
use serde::Serialize;
use tracing::{debug, info};

pub const NMS_CONFIG_PATH: &str = "/nms/config/nmscfg.conf";
pub const COMMON_DATABASE_NAME: &str = "free5gc";
pub const AUTH_DATABASE_NAME: &str = "authentication";

/// Everything the config file is rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInputs {
    pub common_database_url: String,
    pub auth_database_url: String,
    pub endpoint: String,
    pub log_level: String,
}

impl ConfigInputs {
    /// `None` until both database relations carry credentials
    pub fn from_state(state: &ObservedState) -> Option<Self> {
        let common = state.database(COMMON_DATABASE_RELATION)?;
        let auth = state.database(AUTH_DATABASE_RELATION)?;
        Some(Self {
            common_database_url: common.primary_uri().to_string(),
            auth_database_url: auth.primary_uri().to_string(),
            endpoint: state.endpoint(),
            log_level: state.config.log_level.clone(),
        })
    }
}

#[derive(Serialize)]
struct NmsConfigFile<'a> {
    info: Info,
    configuration: Configuration<'a>,
    logger: Logger<'a>,
}

#[derive(Serialize)]
struct Info {
    version: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Configuration<'a> {
    deployment_mode: &'static str,
    webui_endpoint: &'a str,
    enable_authentication: bool,
    mongodb: Mongodb<'a>,
    tls: Tls,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Mongodb<'a> {
    name: &'static str,
    url: &'a str,
    auth_keys_db_name: &'static str,
    auth_url: &'a str,
}

#[derive(Serialize)]
struct Tls {
    pem: &'static str,
    key: &'static str,
}

#[derive(Serialize)]
struct Logger<'a> {
    #[serde(rename = "WEBUI")]
    webui: LogLevel<'a>,
}

#[derive(Serialize)]
struct LogLevel<'a> {
    #[serde(rename = "debugLevel")]
    debug_level: &'a str,
}

/// Render the config file content
pub fn render(inputs: &ConfigInputs) -> Result<String, ControllerError> {
    let file = NmsConfigFile {
        info: Info {
            version: "1.0.0",
            description: "WebUI initial local configuration",
        },
        configuration: Configuration {
            deployment_mode: "5G",
            webui_endpoint: &inputs.endpoint,
            enable_authentication: true,
            mongodb: Mongodb {
                name: COMMON_DATABASE_NAME,
                url: &inputs.common_database_url,
                auth_keys_db_name: AUTH_DATABASE_NAME,
                auth_url: &inputs.auth_database_url,
            },
            tls: Tls {
                pem: CERTIFICATE_PATH,
                key: PRIVATE_KEY_PATH,
            },
        },
        logger: Logger {
            webui: LogLevel {
                debug_level: &inputs.log_level,
            },
        },
    };
    Ok(serde_yaml::to_string(&file)?)
}

/// Write the config file unless it already holds `content`. Returns whether it was written.
pub async fn write_if_changed(workload: &dyn Workload, content: &str) -> Result<bool, ControllerError> {
    if workload.exists(NMS_CONFIG_PATH).await && workload.pull(NMS_CONFIG_PATH).await? == content {
        debug!("Config file {} is up to date", NMS_CONFIG_PATH);
        return Ok(false);
    }
    workload.push(NMS_CONFIG_PATH, content).await?;
    info!("Pushed {} config file", NMS_CONFIG_PATH);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryWorkload, StateBuilder};

    fn inputs() -> ConfigInputs {
        ConfigInputs {
            common_database_url: "1.9.11.4:1234".to_string(),
            auth_database_url: "2.8.10.3:4321".to_string(),
            endpoint: "10.0.0.5:5000".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&inputs()).unwrap(), render(&inputs()).unwrap());
    }

    #[test]
    fn test_render_content() {
        let rendered: serde_yaml::Value = serde_yaml::from_str(&render(&inputs()).unwrap()).unwrap();
        let configuration = &rendered["configuration"];
        assert_eq!(configuration["deploymentMode"], "5G");
        assert_eq!(configuration["enableAuthentication"], true);
        assert_eq!(configuration["mongodb"]["name"], "free5gc");
        assert_eq!(configuration["mongodb"]["url"], "1.9.11.4:1234");
        assert_eq!(configuration["mongodb"]["authKeysDbName"], "authentication");
        assert_eq!(configuration["mongodb"]["authUrl"], "2.8.10.3:4321");
        assert_eq!(configuration["tls"]["pem"], CERTIFICATE_PATH);
        assert_eq!(configuration["tls"]["key"], PRIVATE_KEY_PATH);
        assert_eq!(rendered["logger"]["WEBUI"]["debugLevel"], "info");
    }

    #[test]
    fn test_inputs_require_both_databases() {
        let state = StateBuilder::new().common_database().build();
        assert!(ConfigInputs::from_state(&state).is_none());

        let unpopulated = StateBuilder::new()
            .common_database()
            .relation(AUTH_DATABASE_RELATION, 4, "mongodb", &[("username", "u")])
            .build();
        assert!(ConfigInputs::from_state(&unpopulated).is_none());

        let state = StateBuilder::new().common_database().auth_database().build();
        let inputs = ConfigInputs::from_state(&state).unwrap();
        assert_eq!(inputs.common_database_url, "1.9.11.4:1234");
        assert_eq!(inputs.auth_database_url, "2.8.10.3:4321");
    }

    #[tokio::test]
    async fn test_write_only_when_changed() {
        let workload = MemoryWorkload::ready();
        let content = render(&inputs()).unwrap();

        assert!(write_if_changed(&workload, &content).await.unwrap());
        assert!(!write_if_changed(&workload, &content).await.unwrap());
        assert_eq!(workload.writes(), vec![NMS_CONFIG_PATH]);

        let other = render(&ConfigInputs { log_level: "debug".into(), ..inputs() }).unwrap();
        assert!(write_if_changed(&workload, &other).await.unwrap());
    }
}
