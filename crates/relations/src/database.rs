//! Database relation (MongoDB credentials)

use crate::databag::{Databag, required};
use crate::error::RelationDataError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Credentials published by the database provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseRecord {
    pub username: String,
    pub password: String,
    /// Comma-separated connection URIs
    pub uris: String,
}

impl DatabaseRecord {
    /// Build from the provider databag; every field must be non-empty
    pub fn from_databag(data: &Databag) -> Result<Self, RelationDataError> {
        Ok(Self {
            username: required(data, &["username"])?.to_string(),
            password: required(data, &["password"])?.to_string(),
            uris: required(data, &["uris"])?.to_string(),
        })
    }

    /// First URI of the comma-separated list, used as the connection URL
    pub fn primary_uri(&self) -> &str {
        self.uris.split(',').map(str::trim).next().unwrap_or_default()
    }
}
