//! fiveg_gnb_identity relation (gNB name and TAC advertised by a gNB simulator)

use crate::databag::{Databag, parse_bounded, required};
use crate::error::RelationDataError;
use crate::MAX_TAC;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GnbIdentity {
    /// Name of the gNB
    #[serde(alias = "gnb-name")]
    pub gnb_name: String,
    /// Tracking Area Code
    pub tac: u32,
}

impl GnbIdentity {
    /// Accepts either `gnb_name` or `gnb-name`; `tac` must be within 0..=16777215
    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        let gnb_name = required(data, &["gnb_name", "gnb-name"])?;
        let tac = required(data, &["tac"])?;
        let tac = parse_bounded("tac", tac, 0, i64::from(MAX_TAC))?;
        Ok(Self {
            gnb_name: gnb_name.to_string(),
            tac: u32::try_from(tac).map_err(|e| RelationDataError::invalid("tac", e.to_string()))?,
        })
    }
}
