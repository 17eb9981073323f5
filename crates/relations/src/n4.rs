//! fiveg_n4 relation (UPF N4 endpoint)

use crate::databag::{Databag, parse_bounded, required};
use crate::error::RelationDataError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Host and port of a UPF's N4 interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct N4Endpoint {
    pub upf_hostname: String,
    pub upf_port: u16,
}

impl N4Endpoint {
    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        let upf_hostname = required(data, &["upf_hostname"])?;
        let upf_port = parse_bounded("upf_port", required(data, &["upf_port"])?, 1, 65535)?;
        Ok(Self {
            upf_hostname: upf_hostname.to_string(),
            upf_port: u16::try_from(upf_port)
                .map_err(|e| RelationDataError::invalid("upf_port", e.to_string()))?,
        })
    }
}
