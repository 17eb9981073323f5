//! Operator configuration from environment variables

use crate::error::ControllerError;
use std::env;
use std::path::PathBuf;

const DEFAULT_NMS_URL: &str = "https://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Base URL of the NMS API
    pub nms_url: String,
    /// Root of the workload container filesystem
    pub workload_root: PathBuf,
    /// Namespace holding the login secret
    pub secret_namespace: String,
}

impl OperatorConfig {
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let nms_url = lookup("NMS_URL").unwrap_or_else(|| DEFAULT_NMS_URL.to_string());
        if !nms_url.starts_with("http://") && !nms_url.starts_with("https://") {
            return Err(ControllerError::InvalidConfig(format!(
                "NMS_URL must be an http(s) URL, got {}",
                nms_url
            )));
        }
        let secret_namespace = lookup("SECRET_NAMESPACE").unwrap_or_else(|| "default".to_string());
        if secret_namespace.trim().is_empty() {
            return Err(ControllerError::InvalidConfig(
                "SECRET_NAMESPACE must not be empty".to_string(),
            ));
        }
        Ok(Self {
            nms_url,
            workload_root: lookup("WORKLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/")),
            secret_namespace,
        })
    }
}
