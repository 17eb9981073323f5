//! NMS API client
//!
//! Implements the NMS (SD-Core webconsole) REST API client used by the operator.
//! Endpoints: `/status`, `/login`, `/config/v1/account`,
//! `/config/v1/inventory/{gnb,upf}` and `/config/v1/network-slice`.

use crate::common::HttpClient;
use crate::error::NmsError;
use crate::models::*;
use crate::nms_trait::NmsClientTrait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

const STATUS_URL: &str = "/status";
const LOGIN_URL: &str = "/login";
const ACCOUNTS_URL: &str = "/config/v1/account";
const GNB_CONFIG_URL: &str = "/config/v1/inventory/gnb";
const UPF_CONFIG_URL: &str = "/config/v1/inventory/upf";
const NETWORK_SLICE_CONFIG_URL: &str = "/config/v1/network-slice";

/// NMS API client
#[derive(Debug, Clone)]
pub struct NmsClient {
    http: HttpClient,
}

impl NmsClient {
    /// Create a new NMS client
    ///
    /// # Arguments
    /// * `base_url` - NMS base URL (e.g., "https://nms.sdcore:5000")
    /// * `ca_certificate` - PEM CA bundle to trust. Without it, certificate
    ///   verification is disabled since the NMS serves a self-issued certificate
    ///   until the TLS relation provides one.
    pub fn new(base_url: String, ca_certificate: Option<&str>) -> Result<Self, NmsError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(30));
        builder = match ca_certificate {
            Some(pem) => {
                let certificates = reqwest::Certificate::from_pem_bundle(pem.as_bytes())
                    .map_err(|e| NmsError::InvalidConfig(format!("unparsable CA certificate: {}", e)))?;
                if certificates.is_empty() {
                    return Err(NmsError::InvalidConfig(
                        "unparsable CA certificate: no certificate found".to_string(),
                    ));
                }
                certificates
                    .into_iter()
                    .fold(builder, |builder, certificate| builder.add_root_certificate(certificate))
            }
            None => builder.danger_accept_invalid_certs(true),
        };
        let client = builder.build().map_err(NmsError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url),
        })
    }

    /// GET a JSON document, logging and swallowing any failure
    async fn get_json(&self, path: &str, token: Option<&str>) -> Option<Value> {
        match self.http.request(Method::GET, path, token, None).await {
            Ok(value) => value,
            Err(e) => {
                error!("{} request failed: {}", path, e);
                None
            }
        }
    }

    /// Send a mutating request, logging any failure. Returns whether it succeeded.
    async fn send(&self, method: Method, path: &str, token: Option<&str>, body: Option<&Value>) -> bool {
        match self.http.request(method, path, token, body).await {
            Ok(_) => true,
            Err(e) => {
                error!("{} request failed: {}", path, e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl NmsClientTrait for NmsClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn get_status(&self) -> Option<StatusResponse> {
        let value = self.get_json(STATUS_URL, None).await?;
        serde_json::from_value(value)
            .map_err(|e| error!("invalid status response: {}", e))
            .ok()
    }

    async fn login(&self, username: &str, password: &str) -> Option<LoginResponse> {
        let body = serde_json::to_value(LoginParams { username, password }).ok()?;
        let response = match self.http.request(Method::POST, LOGIN_URL, None, Some(&body)).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                error!("{} request failed: {}", LOGIN_URL, e);
                return None;
            }
        };
        let token = response.get("token")?.as_str()?.to_string();
        Some(LoginResponse { token })
    }

    async fn token_is_valid(&self, token: &str) -> bool {
        self.get_json(ACCOUNTS_URL, Some(token)).await.is_some()
    }

    async fn create_first_user(&self, username: &str, password: &str) {
        info!("Creating first user {}", username);
        let Ok(body) = serde_json::to_value(CreateUserParams { username, password }) else {
            return;
        };
        self.send(Method::POST, ACCOUNTS_URL, None, Some(&body)).await;
    }

    async fn list_gnbs(&self, token: &str) -> Vec<GnodeB> {
        match self.get_json(GNB_CONFIG_URL, Some(token)).await {
            Some(value) => parse_gnb_list(&value),
            None => Vec::new(),
        }
    }

    async fn create_gnb(&self, name: &str, tac: Option<u32>, token: &str) {
        let path = format!("{}/{}", GNB_CONFIG_URL, HttpClient::encode_segment(name));
        let Ok(body) = serde_json::to_value(CreateGnbParams::new(tac)) else {
            return;
        };
        if self.send(Method::POST, &path, Some(token), Some(&body)).await {
            info!("gNB {} created in NMS", name);
        }
    }

    async fn delete_gnb(&self, name: &str, token: &str) {
        let path = format!("{}/{}", GNB_CONFIG_URL, HttpClient::encode_segment(name));
        if self.send(Method::DELETE, &path, Some(token), None).await {
            info!("gNB {} deleted from NMS", name);
        }
    }

    async fn list_upfs(&self, token: &str) -> Vec<Upf> {
        match self.get_json(UPF_CONFIG_URL, Some(token)).await {
            Some(value) => parse_upf_list(&value),
            None => Vec::new(),
        }
    }

    async fn create_upf(&self, hostname: &str, port: u16, token: &str) {
        let path = format!("{}/{}", UPF_CONFIG_URL, HttpClient::encode_segment(hostname));
        let Ok(body) = serde_json::to_value(UpfParams::new(port)) else {
            return;
        };
        if self.send(Method::POST, &path, Some(token), Some(&body)).await {
            info!("UPF {} created in NMS", hostname);
        }
    }

    async fn update_upf(&self, hostname: &str, port: u16, token: &str) {
        let path = format!("{}/{}", UPF_CONFIG_URL, HttpClient::encode_segment(hostname));
        let Ok(body) = serde_json::to_value(UpfParams::new(port)) else {
            return;
        };
        if self.send(Method::PUT, &path, Some(token), Some(&body)).await {
            info!("UPF {} updated in NMS", hostname);
        }
    }

    async fn delete_upf(&self, hostname: &str, token: &str) {
        let path = format!("{}/{}", UPF_CONFIG_URL, HttpClient::encode_segment(hostname));
        if self.send(Method::DELETE, &path, Some(token), None).await {
            info!("UPF {} deleted from NMS", hostname);
        }
    }

    async fn list_network_slices(&self, token: &str) -> Vec<String> {
        match self.get_json(NETWORK_SLICE_CONFIG_URL, Some(token)).await {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    async fn get_network_slice(&self, name: &str, token: &str) -> Option<NetworkSlice> {
        let path = format!("{}/{}", NETWORK_SLICE_CONFIG_URL, HttpClient::encode_segment(name));
        let value = self.get_json(&path, Some(token)).await?;
        parse_network_slice(name, &value)
    }
}

/// Read an integer that the NMS may send either as a JSON number or as a string
fn as_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an optional TAC: absent, null and "" mean unassigned, anything else must parse
fn optional_tac(value: Option<&Value>) -> Result<Option<u32>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => as_integer(v)
            .and_then(|tac| u32::try_from(tac).ok())
            .filter(|tac| *tac <= MAX_TAC)
            .map(Some)
            .ok_or(()),
    }
}

/// Parse the gNB inventory, dropping records with a missing or mistyped field
pub(crate) fn parse_gnb_list(value: &Value) -> Vec<GnodeB> {
    let Some(items) = value.as_array() else {
        error!("invalid gNB list: {}", value);
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
            match (name, optional_tac(item.get("tac"))) {
                (Some(name), Ok(tac)) => Some(GnodeB::new(name, tac)),
                _ => {
                    error!("invalid gNB data: {}", item);
                    None
                }
            }
        })
        .collect()
}

/// Parse the UPF inventory, dropping records with a missing or mistyped field
pub(crate) fn parse_upf_list(value: &Value) -> Vec<Upf> {
    let Some(items) = value.as_array() else {
        error!("invalid UPF list: {}", value);
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let hostname = item.get("hostname").and_then(Value::as_str).filter(|h| !h.is_empty());
            let port = item
                .get("port")
                .and_then(as_integer)
                .and_then(|p| u16::try_from(p).ok())
                .filter(|p| *p != 0);
            match (hostname, port) {
                (Some(hostname), Some(port)) => Some(Upf::new(hostname, port)),
                _ => {
                    error!("invalid UPF data: {}", item);
                    None
                }
            }
        })
        .collect()
}

/// Parse one network slice document. The slice differentiator is stored as hex.
pub(crate) fn parse_network_slice(name: &str, value: &Value) -> Option<NetworkSlice> {
    let site_info = value.get("site-info")?;
    let plmn = site_info.get("plmn")?;
    let slice_id = value.get("slice-id")?;

    let parsed = (|| {
        let mcc = plmn.get("mcc")?.as_str()?.to_string();
        let mnc = plmn.get("mnc")?.as_str()?.to_string();
        let sst = u8::try_from(as_integer(slice_id.get("sst")?)?).ok()?;
        let sd = match slice_id.get("sd") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(u32::from_str_radix(s, 16).ok()?),
            Some(_) => return None,
        };
        let gnodebs = site_info
            .get("gNodeBs")
            .and_then(Value::as_array)
            .map(|gnbs| parse_gnb_list(&Value::Array(gnbs.clone())))
            .unwrap_or_default();
        Some(NetworkSlice {
            name: name.to_string(),
            mcc,
            mnc,
            sst,
            sd,
            gnodebs,
        })
    })();

    if parsed.is_none() {
        error!("invalid network slice {}: {}", name, value);
    } else {
        debug!("Fetched network slice {}", name);
    }
    parsed
}
