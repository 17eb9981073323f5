//! NMS REST API Client
//!
//! A Rust client library for the SD-Core NMS (webconsole) REST API.
//! Covers the status endpoint, account bootstrap, the gNB/UPF inventory and
//! read access to network slices.
//!
//! # Example
//!
//! ```no_run
//! use nms_client::{NmsClient, NmsClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NmsClient::new("https://nms:5000".to_string(), None)?;
//!
//! if client.is_initialized().await {
//!     if let Some(login) = client.login("charm-admin-abcd", "password").await {
//!         for gnb in client.list_gnbs(&login.token).await {
//!             println!("{} tac={:?}", gnb.name, gnb.tac);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Best-effort calls**: failures are logged and degrade to empty results
//! - **Defensive parsing**: malformed inventory records are dropped individually
//! - **test-util**: in-memory `MockNmsClient` for controller unit tests

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod nms_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::NmsClient;
pub use common::HttpClient;
pub use error::NmsError;
pub use models::*;
pub use nms_trait::NmsClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockNmsClient;
