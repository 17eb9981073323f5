//! Controller-specific error types.
//!
//! This module defines error types specific to the NMS operator
//! that are not covered by upstream library errors.

use kube::Error as KubeError;
use nms_client::NmsError;
use thiserror::Error;

/// Errors that can occur in the NMS operator.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// NMS API error
    #[error("NMS error: {0}")]
    Nms(#[from] NmsError),

    /// JSON error (trigger intake, outward records, secret content)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error (config file rendering)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Workload filesystem or process operation failed
    #[error("Workload error: {0}")]
    Workload(String),

    /// Login secret could not be read or written
    #[error("Secret error: {0}")]
    Secret(String),

    /// Malformed trigger line
    #[error("Invalid trigger: {0}")]
    Trigger(String),

    /// Outward application data written by a unit that is not the leader
    #[error("Unit must be leader to set application relation data ({0})")]
    NotLeader(String),
}
