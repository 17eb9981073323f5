//! Account operations for MockNmsClient

use super::MockNmsClient;
use crate::models::*;

pub async fn get_status(client: &MockNmsClient) -> Option<StatusResponse> {
    client.record("get_status".to_string());
    if !client.is_reachable() {
        return None;
    }
    Some(StatusResponse {
        initialized: *client.initialized.lock().unwrap(),
    })
}

pub async fn login(client: &MockNmsClient, username: &str, password: &str) -> Option<LoginResponse> {
    client.record(format!("login {}", username));
    if !client.is_reachable() {
        return None;
    }
    let matches = client
        .users
        .lock()
        .unwrap()
        .get(username)
        .is_some_and(|stored| stored == password);
    matches.then(|| LoginResponse {
        token: client.issue_token(),
    })
}

pub async fn token_is_valid(client: &MockNmsClient, token: &str) -> bool {
    client.record("token_is_valid".to_string());
    client.authorized(token)
}

pub async fn create_first_user(client: &MockNmsClient, username: &str, password: &str) {
    client.record(format!("create_first_user {}", username));
    if client.is_reachable() {
        client.add_user(username, password);
    }
}
