//! TLS artifacts stored in the workload
//!
//! The certificate and CA are rewritten together whenever the assigned
//! certificate differs from the stored one. The private key is compared and
//! rewritten on its own. Comparison is on exact content.

use crate::error::ControllerError;
use crate::state::CertificateBundle;
use crate::workload::Workload;
use tracing::{debug, info};

pub const CERTIFICATE_PATH: &str = "/support/TLS/nms.pem";
pub const PRIVATE_KEY_PATH: &str = "/support/TLS/nms.key";
pub const CA_CERTIFICATE_PATH: &str = "/support/TLS/ca.pem";

pub struct CertificateStore<'a> {
    workload: &'a dyn Workload,
}

impl<'a> CertificateStore<'a> {
    pub fn new(workload: &'a dyn Workload) -> Self {
        Self { workload }
    }

    /// A certificate and a private key are both assigned
    pub fn is_available(bundle: Option<&CertificateBundle>) -> bool {
        bundle.is_some_and(|b| !b.certificate.trim().is_empty() && !b.private_key.trim().is_empty())
    }

    /// Bring the stored artifacts in line with the assigned bundle.
    /// Returns whether any file was written.
    pub async fn check_and_update(
        &self,
        bundle: Option<&CertificateBundle>,
    ) -> Result<bool, ControllerError> {
        let Some(bundle) = bundle.filter(|b| Self::is_available(Some(b))) else {
            debug!("No certificate assigned, leaving stored TLS artifacts untouched");
            return Ok(false);
        };

        let mut changed = false;
        if self.stored(CERTIFICATE_PATH).await.as_deref() != Some(bundle.certificate.as_str()) {
            self.workload.push(CERTIFICATE_PATH, &bundle.certificate).await?;
            self.workload.push(CA_CERTIFICATE_PATH, &bundle.ca).await?;
            info!("Pushed certificate and CA to workload");
            changed = true;
        }
        if self.stored(PRIVATE_KEY_PATH).await.as_deref() != Some(bundle.private_key.as_str()) {
            self.workload.push(PRIVATE_KEY_PATH, &bundle.private_key).await?;
            info!("Pushed private key to workload");
            changed = true;
        }
        Ok(changed)
    }

    /// Remove certificate, key and CA. Absent files are skipped.
    pub async fn clean_up(&self) -> Result<(), ControllerError> {
        for path in [CERTIFICATE_PATH, PRIVATE_KEY_PATH, CA_CERTIFICATE_PATH] {
            self.workload.remove_path(path).await?;
        }
        info!("Removed TLS artifacts from workload");
        Ok(())
    }

    /// Stored CA certificate, used to verify the NMS API
    pub async fn ca_certificate(&self) -> Option<String> {
        self.stored(CA_CERTIFICATE_PATH)
            .await
            .filter(|ca| !ca.trim().is_empty())
    }

    async fn stored(&self, path: &str) -> Option<String> {
        if !self.workload.exists(path).await {
            return None;
        }
        self.workload.pull(path).await.ok()
    }
}
