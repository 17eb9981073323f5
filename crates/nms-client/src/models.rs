//! NMS API models
//!
//! Inventory records are exchanged with string-typed numeric fields on the wire
//! (`{"tac": "1"}`, `{"port": "8805"}`). They are converted to integers as soon as
//! they are parsed and only turned back into strings in the request bodies below.

use serde::{Deserialize, Serialize};

/// Largest Tracking Area Code (24 bits)
pub const MAX_TAC: u32 = 16_777_215;

/// gNodeB registered in the NMS inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GnodeB {
    pub name: String,
    /// Tracking area code, `None` when the NMS has not assigned one yet
    pub tac: Option<u32>,
}

impl GnodeB {
    pub fn new(name: impl Into<String>, tac: Option<u32>) -> Self {
        Self { name: name.into(), tac }
    }
}

/// User Plane Function registered in the NMS inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upf {
    pub hostname: String,
    pub port: u16,
}

impl Upf {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self { hostname: hostname.into(), port }
    }
}

/// Network slice as configured in the NMS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSlice {
    pub name: String,
    pub mcc: String,
    pub mnc: String,
    pub sst: u8,
    /// Slice differentiator, converted from the hex string the NMS stores
    pub sd: Option<u32>,
    pub gnodebs: Vec<GnodeB>,
}

/// Response of `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub initialized: bool,
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginParams<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `POST /config/v1/account`
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserParams<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of `POST /config/v1/inventory/gnb/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateGnbParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tac: Option<String>,
}

impl CreateGnbParams {
    pub fn new(tac: Option<u32>) -> Self {
        Self { tac: tac.map(|t| t.to_string()) }
    }
}

/// Body of `POST`/`PUT /config/v1/inventory/upf/<hostname>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpfParams {
    pub port: String,
}

impl UpfParams {
    pub fn new(port: u16) -> Self {
        Self { port: port.to_string() }
    }
}
