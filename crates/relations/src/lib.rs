//! NMS Operator Relation Data
//!
//! Typed records for the relation databags the NMS operator reads and publishes.
//! Raw databags are string-to-string maps written by untrusted peers, so every
//! record is built through an explicit `from_databag` validation step that
//! returns a `RelationDataError` instead of panicking.

pub mod core_gnb;
pub mod database;
pub mod databag;
pub mod error;
pub mod gnb_identity;
pub mod n4;
pub mod sdcore_config;

pub use core_gnb::*;
pub use database::*;
pub use databag::Databag;
pub use error::RelationDataError;
pub use gnb_identity::*;
pub use n4::*;
pub use sdcore_config::*;

/// Largest Tracking Area Code (24 bits)
pub const MAX_TAC: u32 = 16_777_215;

/// Largest slice differentiator (24 bits)
pub const MAX_SD: u32 = 16_777_215;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_describe_databag_keys() {
        let provider = serde_json::to_value(schemars::schema_for!(GnbConfig)).unwrap();
        assert!(provider["properties"].get("tac").is_some());
        assert!(provider["properties"].get("plmns").is_some());

        let requirer = serde_json::to_value(schemars::schema_for!(CoreGnbRequirerData)).unwrap();
        assert!(requirer["properties"].get("gnb-name").is_some());
    }
}
