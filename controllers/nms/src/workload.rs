//! Workload capability
//!
//! The NMS container is driven through the `Workload` trait: file access below
//! the container root plus a single supervised service. `LocalWorkload` runs
//! the service as a child process of the operator.

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Directory holding the rendered NMS config file
pub const BASE_CONFIG_PATH: &str = "/nms/config";
/// Directory holding the TLS artifacts
pub const CERTS_MOUNT_PATH: &str = "/support/TLS";
pub const WORKLOAD_VERSION_PATH: &str = "/etc/workload-version";

/// Command and environment of the NMS service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub command: String,
    pub environment: BTreeMap<String, String>,
}

impl ServicePlan {
    /// Plan running `webconsole` against the rendered config file
    pub fn nms(config_path: &str, endpoint: &str, log_level: &str) -> Self {
        Self {
            command: format!("/bin/webconsole --cfg {}", config_path),
            environment: BTreeMap::from([
                ("CONFIGPOD_DEPLOYMENT".to_string(), "5G".to_string()),
                ("WEBUI_ENDPOINT".to_string(), endpoint.to_string()),
                ("GRPC_GO_LOG_SEVERITY_LEVEL".to_string(), log_level.to_string()),
            ]),
        }
    }
}

/// Operations the operator performs on the workload container
#[async_trait::async_trait]
pub trait Workload: Send + Sync {
    async fn can_connect(&self) -> bool;
    async fn exists(&self, path: &str) -> bool;
    async fn pull(&self, path: &str) -> Result<String, ControllerError>;
    /// Write a file, creating missing parent directories
    async fn push(&self, path: &str, content: &str) -> Result<(), ControllerError>;
    async fn make_dir(&self, path: &str) -> Result<(), ControllerError>;
    /// Remove a file or directory; absent paths are not an error
    async fn remove_path(&self, path: &str) -> Result<(), ControllerError>;
    async fn plan(&self) -> Option<ServicePlan>;
    /// Replace the service plan and (re)start the service with it
    async fn apply_plan(&self, plan: ServicePlan) -> Result<(), ControllerError>;
    async fn restart(&self) -> Result<(), ControllerError>;
    async fn service_running(&self) -> bool;
}

/// Both storage mounts are present
pub async fn storage_attached(workload: &dyn Workload) -> bool {
    workload.exists(BASE_CONFIG_PATH).await && workload.exists(CERTS_MOUNT_PATH).await
}

/// Content of the workload version file, empty when the image has none
pub async fn workload_version(workload: &dyn Workload) -> String {
    if !workload.exists(WORKLOAD_VERSION_PATH).await {
        return String::new();
    }
    match workload.pull(WORKLOAD_VERSION_PATH).await {
        Ok(version) => version.trim().to_string(),
        Err(e) => {
            warn!("Failed to read workload version: {}", e);
            String::new()
        }
    }
}

/// Workload whose filesystem is a local directory and whose service is a child process
#[derive(Debug)]
pub struct LocalWorkload {
    root: PathBuf,
    plan: Mutex<Option<ServicePlan>>,
    child: Mutex<Option<Child>>,
}

impl LocalWorkload {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            plan: Mutex::new(None),
            child: Mutex::new(None),
        }
    }

    /// Map an absolute workload path below the root
    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn io_error(path: &Path, e: &std::io::Error) -> ControllerError {
        ControllerError::Workload(format!("{}: {}", path.display(), e))
    }

    /// Split the service command. Absolute arguments name workload files and
    /// are mapped below the root; the program itself is left as is.
    fn command_line(&self, command: &str) -> Result<(String, Vec<PathBuf>), ControllerError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| ControllerError::Workload("empty service command".to_string()))?;
        let args = parts
            .map(|arg| {
                if arg.starts_with('/') {
                    self.resolve(arg)
                } else {
                    PathBuf::from(arg)
                }
            })
            .collect();
        Ok((program.to_string(), args))
    }

    async fn start(&self, child: &mut Option<Child>) -> Result<(), ControllerError> {
        let plan = self.plan.lock().await.clone();
        let Some(plan) = plan else {
            debug!("No service plan, nothing to start");
            return Ok(());
        };
        let (program, args) = self.command_line(&plan.command)?;
        let spawned = Command::new(&program)
            .args(&args)
            .envs(&plan.environment)
            .current_dir(&self.root)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ControllerError::Workload(format!("failed to start {}: {}", program, e)))?;
        info!("Started service: {}", plan.command);
        *child = Some(spawned);
        Ok(())
    }

    async fn stop(child: &mut Option<Child>) {
        if let Some(mut running) = child.take() {
            if let Err(e) = running.kill().await {
                warn!("Failed to stop service: {}", e);
            }
        }
    }
}

#[async_trait::async_trait]
impl Workload for LocalWorkload {
    async fn can_connect(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .is_ok_and(|m| m.is_dir())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn pull(&self, path: &str) -> Result<String, ControllerError> {
        let local = self.resolve(path);
        tokio::fs::read_to_string(&local)
            .await
            .map_err(|e| Self::io_error(&local, &e))
    }

    async fn push(&self, path: &str, content: &str) -> Result<(), ControllerError> {
        let local = self.resolve(path);
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(parent, &e))?;
        }
        tokio::fs::write(&local, content)
            .await
            .map_err(|e| Self::io_error(&local, &e))
    }

    async fn make_dir(&self, path: &str) -> Result<(), ControllerError> {
        let local = self.resolve(path);
        tokio::fs::create_dir_all(&local)
            .await
            .map_err(|e| Self::io_error(&local, &e))
    }

    async fn remove_path(&self, path: &str) -> Result<(), ControllerError> {
        let local = self.resolve(path);
        let result = match tokio::fs::metadata(&local).await {
            Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&local).await,
            Ok(_) => tokio::fs::remove_file(&local).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&local, &e)),
        }
    }

    async fn plan(&self) -> Option<ServicePlan> {
        self.plan.lock().await.clone()
    }

    async fn apply_plan(&self, plan: ServicePlan) -> Result<(), ControllerError> {
        *self.plan.lock().await = Some(plan);
        let mut child = self.child.lock().await;
        Self::stop(&mut child).await;
        self.start(&mut child).await
    }

    async fn restart(&self) -> Result<(), ControllerError> {
        let mut child = self.child.lock().await;
        Self::stop(&mut child).await;
        self.start(&mut child).await
    }

    async fn service_running(&self) -> bool {
        let mut child = self.child.lock().await;
        match child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                warn!("Service exited: {}", status);
                *child = None;
                false
            }
            Some(Err(e)) => {
                warn!("Failed to query service state: {}", e);
                false
            }
            None => false,
        }
    }
}
