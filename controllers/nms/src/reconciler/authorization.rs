//! Admin account bootstrap and session token

use super::Reconciler;
use crate::error::ControllerError;
use crate::secrets::{LoginSecret, NMS_LOGIN_SECRET_LABEL};
use nms_client::NmsClientTrait;
use tracing::{debug, info, warn};

impl Reconciler {
    /// Make sure the operator's admin account exists and return a valid session token.
    ///
    /// `None` when the NMS API is unreachable or the stored credentials are rejected.
    pub(crate) async fn authorize(
        &self,
        nms: &dyn NmsClientTrait,
    ) -> Result<Option<String>, ControllerError> {
        if !nms.is_api_available().await {
            debug!("NMS API not available, skipping authorization");
            return Ok(None);
        }

        let mut login = match self.secrets.get(NMS_LOGIN_SECRET_LABEL).await? {
            Some(content) => LoginSecret::from_content(&content),
            None => {
                let login = LoginSecret::generate();
                self.secrets
                    .create(NMS_LOGIN_SECRET_LABEL, login.to_content())
                    .await?;
                info!("admin account details saved to secrets.");
                login
            }
        };

        if !nms.is_initialized().await {
            info!("Initializing NMS with the operator's admin account");
            nms.create_first_user(&login.username, &login.password).await;
        }

        if !login.token.is_empty() && nms.token_is_valid(&login.token).await {
            return Ok(Some(login.token));
        }

        let Some(response) = nms.login(&login.username, &login.password).await else {
            warn!(
                "Failed to login to NMS as {}. Update the {} secret with valid credentials",
                login.username, NMS_LOGIN_SECRET_LABEL
            );
            return Ok(None);
        };
        login.token = response.token;
        self.secrets
            .set_content(NMS_LOGIN_SECRET_LABEL, login.to_content())
            .await?;
        debug!("Stored new NMS session token");
        Ok(Some(login.token))
    }
}
