//! Inventory operations for MockNmsClient
//!
//! Handles gNBs, UPFs and network slices

use super::MockNmsClient;
use crate::models::*;

pub async fn list_gnbs(client: &MockNmsClient, token: &str) -> Vec<GnodeB> {
    client.record("list_gnbs".to_string());
    if !client.authorized(token) {
        return Vec::new();
    }
    client.gnbs()
}

pub async fn create_gnb(client: &MockNmsClient, name: &str, tac: Option<u32>, token: &str) {
    client.record(format!("create_gnb {}", name));
    if client.accepts_mutation(name, token) {
        client.add_gnb(GnodeB::new(name, tac));
    }
}

pub async fn delete_gnb(client: &MockNmsClient, name: &str, token: &str) {
    client.record(format!("delete_gnb {}", name));
    if client.accepts_mutation(name, token) {
        client.gnbs.lock().unwrap().remove(name);
    }
}

pub async fn list_upfs(client: &MockNmsClient, token: &str) -> Vec<Upf> {
    client.record("list_upfs".to_string());
    if !client.authorized(token) {
        return Vec::new();
    }
    client.upfs()
}

pub async fn create_upf(client: &MockNmsClient, hostname: &str, port: u16, token: &str) {
    client.record(format!("create_upf {}", hostname));
    if client.accepts_mutation(hostname, token) {
        client.add_upf(Upf::new(hostname, port));
    }
}

pub async fn update_upf(client: &MockNmsClient, hostname: &str, port: u16, token: &str) {
    client.record(format!("update_upf {}", hostname));
    if client.accepts_mutation(hostname, token) {
        if let Some(upf) = client.upfs.lock().unwrap().get_mut(hostname) {
            upf.port = port;
        }
    }
}

pub async fn delete_upf(client: &MockNmsClient, hostname: &str, token: &str) {
    client.record(format!("delete_upf {}", hostname));
    if client.accepts_mutation(hostname, token) {
        client.upfs.lock().unwrap().remove(hostname);
    }
}

pub async fn list_network_slices(client: &MockNmsClient, token: &str) -> Vec<String> {
    client.record("list_network_slices".to_string());
    if !client.authorized(token) {
        return Vec::new();
    }
    client.slices.lock().unwrap().keys().cloned().collect()
}

pub async fn get_network_slice(client: &MockNmsClient, name: &str, token: &str) -> Option<NetworkSlice> {
    client.record(format!("get_network_slice {}", name));
    if !client.authorized(token) {
        return None;
    }
    client.slices.lock().unwrap().get(name).cloned()
}
