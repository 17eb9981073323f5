//! Login secret
//!
//! Credentials of the operator's NMS admin account and its current session
//! token are kept in a secret looked up by label.

use crate::error::ControllerError;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const NMS_LOGIN_SECRET_LABEL: &str = "NMS_LOGIN";
/// Kubernetes label carrying the secret label
pub const SECRET_LABEL_KEY: &str = "sdcore.canonical.com/secret-label";

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

pub type SecretContent = BTreeMap<String, String>;

/// Storage for labelled secrets
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// `None` when no secret carries the label
    async fn get(&self, label: &str) -> Result<Option<SecretContent>, ControllerError>;
    async fn create(&self, label: &str, content: SecretContent) -> Result<(), ControllerError>;
    async fn set_content(&self, label: &str, content: SecretContent) -> Result<(), ControllerError>;
}

/// NMS admin credentials and session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSecret {
    pub username: String,
    pub password: String,
    /// Empty until the first successful login
    #[serde(default)]
    pub token: String,
}

impl LoginSecret {
    /// Fresh credentials without a token
    pub fn generate() -> Self {
        Self {
            username: generate_username(),
            password: generate_password(),
            token: String::new(),
        }
    }

    pub fn from_content(content: &SecretContent) -> Self {
        let field = |key: &str| content.get(key).cloned().unwrap_or_default();
        Self {
            username: field("username"),
            password: field("password"),
            token: field("token"),
        }
    }

    pub fn to_content(&self) -> SecretContent {
        BTreeMap::from([
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
            ("token".to_string(), self.token.clone()),
        ])
    }
}

fn pick(rng: &mut impl Rng, alphabet: &[u8]) -> char {
    char::from(alphabet[rng.gen_range(0..alphabet.len())])
}

/// `charm-admin-` followed by four uppercase letters
pub fn generate_username() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4).map(|_| pick(&mut rng, UPPERCASE)).collect();
    format!("charm-admin-{}", suffix)
}

/// 11 characters with at least one lowercase letter, one uppercase letter and one digit
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    let alphanumeric = [LOWERCASE, UPPERCASE, DIGITS].concat();
    let mut password = vec![
        pick(&mut rng, LOWERCASE),
        pick(&mut rng, UPPERCASE),
        pick(&mut rng, DIGITS),
    ];
    password.extend((0..8).map(|_| pick(&mut rng, &alphanumeric)));
    password.shuffle(&mut rng);
    password.into_iter().collect()
}

/// Secrets stored as Kubernetes `Secret` objects in one namespace
#[derive(Clone)]
pub struct KubeSecretStore {
    api: Api<Secret>,
}

impl KubeSecretStore {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }

    /// Object name derived from the label, e.g. `NMS_LOGIN` -> `nms-login`
    fn secret_name(label: &str) -> String {
        label.to_lowercase().replace('_', "-")
    }
}

#[async_trait::async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, label: &str) -> Result<Option<SecretContent>, ControllerError> {
        let name = Self::secret_name(label);
        let Some(secret) = self.api.get_opt(&name).await? else {
            info!("{} secret not found.", label);
            return Ok(None);
        };
        let mut content = SecretContent::new();
        for (key, value) in secret.data.unwrap_or_default() {
            let value = String::from_utf8(value.0)
                .map_err(|e| ControllerError::Secret(format!("{}/{} is not UTF-8: {}", name, key, e)))?;
            content.insert(key, value);
        }
        content.extend(secret.string_data.unwrap_or_default());
        Ok(Some(content))
    }

    async fn create(&self, label: &str, content: SecretContent) -> Result<(), ControllerError> {
        let name = Self::secret_name(label);
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                labels: Some(BTreeMap::from([(SECRET_LABEL_KEY.to_string(), label.to_string())])),
                ..Default::default()
            },
            string_data: Some(content),
            ..Default::default()
        };
        self.api.create(&PostParams::default(), &secret).await?;
        debug!("Created secret {}", name);
        Ok(())
    }

    async fn set_content(&self, label: &str, content: SecretContent) -> Result<(), ControllerError> {
        let name = Self::secret_name(label);
        let patch = serde_json::json!({ "stringData": content });
        self.api
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        debug!("Updated secret {}", name);
        Ok(())
    }
}
