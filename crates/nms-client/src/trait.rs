//! NmsClient trait for mocking
//!
//! This trait abstracts the NmsClient to enable mocking in unit tests.
//! The concrete NmsClient implements this trait, and tests use `MockNmsClient`.
//!
//! Every operation is best-effort: connectivity failures and HTTP error statuses
//! are logged by the implementation and surface as an empty list, `None`, `false`
//! or a no-op. Callers re-derive their intent on the next reconciliation pass.

use crate::models::*;

/// Trait for NMS API client operations
#[async_trait::async_trait]
pub trait NmsClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// `GET /status`, `None` when the API cannot be reached
    async fn get_status(&self) -> Option<StatusResponse>;

    /// Whether the NMS API answers at all
    async fn is_api_available(&self) -> bool {
        self.get_status().await.is_some()
    }

    /// Whether the NMS reports that its first user has been created
    async fn is_initialized(&self) -> bool {
        self.get_status().await.is_some_and(|s| s.initialized)
    }

    // Accounts
    async fn login(&self, username: &str, password: &str) -> Option<LoginResponse>;
    async fn token_is_valid(&self, token: &str) -> bool;
    async fn create_first_user(&self, username: &str, password: &str);

    // Inventory
    async fn list_gnbs(&self, token: &str) -> Vec<GnodeB>;
    async fn create_gnb(&self, name: &str, tac: Option<u32>, token: &str);
    async fn delete_gnb(&self, name: &str, token: &str);
    async fn list_upfs(&self, token: &str) -> Vec<Upf>;
    async fn create_upf(&self, hostname: &str, port: u16, token: &str);
    async fn update_upf(&self, hostname: &str, port: u16, token: &str);
    async fn delete_upf(&self, hostname: &str, token: &str);

    // Network slices
    async fn list_network_slices(&self, token: &str) -> Vec<String>;
    async fn get_network_slice(&self, name: &str, token: &str) -> Option<NetworkSlice>;
}
