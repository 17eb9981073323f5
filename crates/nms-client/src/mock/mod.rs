//! Mock NmsClient for unit testing
//!
//! This module provides a mock implementation of NmsClientTrait that can be used
//! in unit tests without requiring a running NMS instance.
//!
//! - `accounts.rs` - status, first user, login and token checks
//! - `inventory.rs` - gNB/UPF inventory and network slices
//!
//! Every call is recorded in a call log so tests can assert on exactly which
//! remote operations a reconciliation pass issued.

mod accounts;
mod inventory;

use crate::models::*;
use crate::nms_trait::NmsClientTrait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock NmsClient for testing
///
/// Stores inventory in memory. The API can be made unreachable, and individual
/// gNB/UPF names can be configured to fail their mutations.
#[derive(Clone)]
pub struct MockNmsClient {
    pub(crate) base_url: String,
    pub(crate) reachable: Arc<Mutex<bool>>,
    pub(crate) initialized: Arc<Mutex<bool>>,
    // In-memory storage
    pub(crate) users: Arc<Mutex<HashMap<String, String>>>,
    pub(crate) tokens: Arc<Mutex<HashSet<String>>>,
    pub(crate) gnbs: Arc<Mutex<BTreeMap<String, GnodeB>>>,
    pub(crate) upfs: Arc<Mutex<BTreeMap<String, Upf>>>,
    pub(crate) slices: Arc<Mutex<BTreeMap<String, NetworkSlice>>>,
    pub(crate) failing: Arc<Mutex<HashSet<String>>>,
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
    // Counter for generating tokens
    pub(crate) next_token: Arc<Mutex<u64>>,
}

impl MockNmsClient {
    /// Create a new mock client: reachable, not initialized, empty inventory
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            reachable: Arc::new(Mutex::new(true)),
            initialized: Arc::new(Mutex::new(false)),
            users: Arc::new(Mutex::new(HashMap::new())),
            tokens: Arc::new(Mutex::new(HashSet::new())),
            gnbs: Arc::new(Mutex::new(BTreeMap::new())),
            upfs: Arc::new(Mutex::new(BTreeMap::new())),
            slices: Arc::new(Mutex::new(BTreeMap::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_token: Arc::new(Mutex::new(1)),
        }
    }

    /// Make the API (un)reachable
    pub fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock().unwrap() = reachable;
    }

    /// Register a user and mark the NMS initialized (for test setup)
    pub fn add_user(&self, username: &str, password: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), password.to_string());
        *self.initialized.lock().unwrap() = true;
    }

    /// Accept a token as valid (for test setup)
    pub fn add_token(&self, token: &str) {
        self.tokens.lock().unwrap().insert(token.to_string());
    }

    /// Revoke every issued token
    pub fn revoke_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    /// Add a gNB to the mock store (for test setup)
    pub fn add_gnb(&self, gnb: GnodeB) {
        self.gnbs.lock().unwrap().insert(gnb.name.clone(), gnb);
    }

    /// Add a UPF to the mock store (for test setup)
    pub fn add_upf(&self, upf: Upf) {
        self.upfs.lock().unwrap().insert(upf.hostname.clone(), upf);
    }

    /// Add a network slice to the mock store (for test setup)
    pub fn add_network_slice(&self, slice: NetworkSlice) {
        self.slices.lock().unwrap().insert(slice.name.clone(), slice);
    }

    /// Make every mutation of the given gNB name or UPF hostname fail
    pub fn fail_mutations_for(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Current gNB inventory, ordered by name
    pub fn gnbs(&self) -> Vec<GnodeB> {
        self.gnbs.lock().unwrap().values().cloned().collect()
    }

    /// Current UPF inventory, ordered by hostname
    pub fn upfs(&self) -> Vec<Upf> {
        self.upfs.lock().unwrap().values().cloned().collect()
    }

    /// Recorded calls, e.g. `"create_gnb gnb1"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded mutating inventory calls only
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                ["create_gnb ", "delete_gnb ", "create_upf ", "update_upf ", "delete_upf "]
                    .iter()
                    .any(|prefix| c.starts_with(prefix))
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub(crate) fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn is_reachable(&self) -> bool {
        *self.reachable.lock().unwrap()
    }

    /// Reachable and holding a valid token
    pub(crate) fn authorized(&self, token: &str) -> bool {
        self.is_reachable() && self.tokens.lock().unwrap().contains(token)
    }

    /// Whether a mutation on `name` should be applied
    pub(crate) fn accepts_mutation(&self, name: &str, token: &str) -> bool {
        self.authorized(token) && !self.failing.lock().unwrap().contains(name)
    }

    pub(crate) fn issue_token(&self) -> String {
        let mut next = self.next_token.lock().unwrap();
        let token = format!("token-{}", *next);
        *next += 1;
        self.tokens.lock().unwrap().insert(token.clone());
        token
    }
}

#[async_trait::async_trait]
impl NmsClientTrait for MockNmsClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    // Accounts - delegated to accounts module
    async fn get_status(&self) -> Option<StatusResponse> {
        accounts::get_status(self).await
    }

    async fn login(&self, username: &str, password: &str) -> Option<LoginResponse> {
        accounts::login(self, username, password).await
    }

    async fn token_is_valid(&self, token: &str) -> bool {
        accounts::token_is_valid(self, token).await
    }

    async fn create_first_user(&self, username: &str, password: &str) {
        accounts::create_first_user(self, username, password).await
    }

    // Inventory - delegated to inventory module
    async fn list_gnbs(&self, token: &str) -> Vec<GnodeB> {
        inventory::list_gnbs(self, token).await
    }

    async fn create_gnb(&self, name: &str, tac: Option<u32>, token: &str) {
        inventory::create_gnb(self, name, tac, token).await
    }

    async fn delete_gnb(&self, name: &str, token: &str) {
        inventory::delete_gnb(self, name, token).await
    }

    async fn list_upfs(&self, token: &str) -> Vec<Upf> {
        inventory::list_upfs(self, token).await
    }

    async fn create_upf(&self, hostname: &str, port: u16, token: &str) {
        inventory::create_upf(self, hostname, port, token).await
    }

    async fn update_upf(&self, hostname: &str, port: u16, token: &str) {
        inventory::update_upf(self, hostname, port, token).await
    }

    async fn delete_upf(&self, hostname: &str, token: &str) {
        inventory::delete_upf(self, hostname, token).await
    }

    async fn list_network_slices(&self, token: &str) -> Vec<String> {
        inventory::list_network_slices(self, token).await
    }

    async fn get_network_slice(&self, name: &str, token: &str) -> Option<NetworkSlice> {
        inventory::get_network_slice(self, name, token).await
    }
}
