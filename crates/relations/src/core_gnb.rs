//! fiveg_core_gnb relation
//!
//! The requirer (a CU/gNB) publishes its name. The NMS operator, as provider,
//! answers with the gNB's TAC and the PLMNs of every network slice the gNB is
//! part of.
//!
//! Provider databag:
//!
//! ```text
//! tac:   "1"
//! plmns: '[{"mcc": "001", "mnc": "01", "sst": 1, "sd": 1056816}]'
//! ```

use crate::databag::{Databag, is_valid_gnb_name, parse_bounded, required};
use crate::error::RelationDataError;
use crate::{MAX_SD, MAX_TAC};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requirer side: the CU/gNB identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoreGnbRequirerData {
    /// CU/gNB unique identifier
    #[serde(rename = "gnb-name", alias = "cu_name")]
    pub gnb_name: String,
}

impl CoreGnbRequirerData {
    /// Accepts `gnb-name` or the older `cu_name` key
    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        let gnb_name = required(data, &["gnb-name", "cu_name"])?;
        if !is_valid_gnb_name(gnb_name) {
            return Err(RelationDataError::invalid(
                "gnb-name",
                format!("{:?} does not match ^[a-zA-Z][a-zA-Z0-9-_]{{1,255}}$", gnb_name),
            ));
        }
        Ok(Self {
            gnb_name: gnb_name.to_string(),
        })
    }
}

/// One PLMN and network slice selector served to a gNB
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PlmnConfig {
    /// Mobile Country Code, three digits
    pub mcc: String,
    /// Mobile Network Code, two or three digits
    pub mnc: String,
    /// Slice/Service Type
    pub sst: u8,
    /// Slice Differentiator
    #[serde(default)]
    pub sd: Option<u32>,
}

impl PlmnConfig {
    pub fn new(mcc: impl Into<String>, mnc: impl Into<String>, sst: u8, sd: Option<u32>) -> Self {
        Self {
            mcc: mcc.into(),
            mnc: mnc.into(),
            sst,
            sd,
        }
    }

    pub fn validate(&self) -> Result<(), RelationDataError> {
        if !is_digits(&self.mcc, 3..=3) {
            return Err(RelationDataError::invalid("mcc", format!("{:?} is not 3 digits", self.mcc)));
        }
        if !is_digits(&self.mnc, 2..=3) {
            return Err(RelationDataError::invalid("mnc", format!("{:?} is not 2-3 digits", self.mnc)));
        }
        if self.sd.is_some_and(|sd| sd > MAX_SD) {
            return Err(RelationDataError::invalid("sd", format!("{:?} exceeds {}", self.sd, MAX_SD)));
        }
        Ok(())
    }

    /// Parse one entry of a `plmns` array; `sst` and `sd` may be numbers or strings
    fn from_value(value: &Value) -> Result<Self, RelationDataError> {
        let text = |field: &'static str| -> Result<String, RelationDataError> {
            value
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(RelationDataError::MissingField(field))
        };
        let integer = |field: &'static str, max: u32| -> Result<Option<u32>, RelationDataError> {
            match value.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(n)) => n
                    .as_u64()
                    .filter(|v| *v <= u64::from(max))
                    .and_then(|v| u32::try_from(v).ok())
                    .map(Some)
                    .ok_or_else(|| RelationDataError::invalid(field, n.to_string())),
                Some(Value::String(s)) => {
                    let v = parse_bounded(field, s, 0, i64::from(max))?;
                    Ok(u32::try_from(v).ok())
                }
                Some(other) => Err(RelationDataError::invalid(field, other.to_string())),
            }
        };

        let sst = integer("sst", u32::from(u8::MAX))?.ok_or(RelationDataError::MissingField("sst"))?;
        let plmn = Self {
            mcc: text("mcc")?,
            mnc: text("mnc")?,
            sst: u8::try_from(sst).map_err(|e| RelationDataError::invalid("sst", e.to_string()))?,
            sd: integer("sd", MAX_SD)?,
        };
        plmn.validate()?;
        Ok(plmn)
    }
}

fn is_digits(value: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// Provider side: configuration the NMS hands to a gNB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GnbConfig {
    /// Tracking Area Code, 1..=16777215
    pub tac: u32,
    /// At least one PLMN
    pub plmns: Vec<PlmnConfig>,
}

impl GnbConfig {
    pub fn validate(&self) -> Result<(), RelationDataError> {
        if self.tac == 0 || self.tac > MAX_TAC {
            return Err(RelationDataError::invalid("tac", format!("{} is outside 1..={}", self.tac, MAX_TAC)));
        }
        if self.plmns.is_empty() {
            return Err(RelationDataError::invalid("plmns", "at least one PLMN is required"));
        }
        self.plmns.iter().try_for_each(PlmnConfig::validate)
    }

    /// Render the provider databag. Invalid configuration is never rendered.
    pub fn to_databag(&self) -> Result<Databag, RelationDataError> {
        self.validate()?;
        let plmns = serde_json::to_string(&self.plmns)
            .map_err(|e| RelationDataError::invalid("plmns", e.to_string()))?;
        Ok(Databag::from([
            ("tac".to_string(), self.tac.to_string()),
            ("plmns".to_string(), plmns),
        ]))
    }

    /// Read a provider databag. A malformed PLMN entry is dropped on its own;
    /// the record is rejected only when no valid entry remains.
    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        let tac = parse_bounded("tac", required(data, &["tac"])?, 1, i64::from(MAX_TAC))?;
        let raw: Value = serde_json::from_str(required(data, &["plmns"])?)
            .map_err(|e| RelationDataError::invalid("plmns", e.to_string()))?;
        let entries = raw
            .as_array()
            .ok_or_else(|| RelationDataError::invalid("plmns", "not a JSON array"))?;
        let plmns: Vec<PlmnConfig> = entries
            .iter()
            .filter_map(|entry| PlmnConfig::from_value(entry).ok())
            .collect();
        let config = Self {
            tac: u32::try_from(tac).map_err(|e| RelationDataError::invalid("tac", e.to_string()))?,
            plmns,
        };
        config.validate()?;
        Ok(config)
    }
}
