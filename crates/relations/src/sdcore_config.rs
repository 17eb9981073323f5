//! sdcore_config relation (webui address handed to the other SD-Core charms)

use crate::databag::{Databag, required};
use crate::error::RelationDataError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Port of the NMS gRPC config service
pub const WEBUI_GRPC_PORT: u16 = 9876;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SdcoreConfig {
    /// `<host>:<port>` of the webui config service
    pub webui_url: String,
}

impl SdcoreConfig {
    /// Address served by the application named `app_name`
    pub fn for_app(app_name: &str) -> Self {
        Self {
            webui_url: format!("{}:{}", app_name, WEBUI_GRPC_PORT),
        }
    }

    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        Ok(Self {
            webui_url: required(data, &["webui_url"])?.to_string(),
        })
    }

    pub fn to_databag(&self) -> Result<Databag, RelationDataError> {
        if self.webui_url.trim().is_empty() {
            return Err(RelationDataError::MissingField("webui_url"));
        }
        Ok(Databag::from([("webui_url".to_string(), self.webui_url.clone())]))
    }
}
