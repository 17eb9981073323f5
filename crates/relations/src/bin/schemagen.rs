//! Print the JSON Schema of every relation databag record
//!
//! Usage: `cargo run -p relations --bin schemagen > schemas.json`

use relations::{
    CoreGnbRequirerData, DatabaseRecord, GnbConfig, GnbIdentity, N4Endpoint, SdcoreConfig,
};
use schemars::schema_for;
use serde_json::json;

fn main() -> Result<(), serde_json::Error> {
    let schemas = json!({
        "database": schema_for!(DatabaseRecord),
        "fiveg_gnb_identity": schema_for!(GnbIdentity),
        "fiveg_core_gnb_requirer": schema_for!(CoreGnbRequirerData),
        "fiveg_core_gnb_provider": schema_for!(GnbConfig),
        "fiveg_n4": schema_for!(N4Endpoint),
        "sdcore_config": schema_for!(SdcoreConfig),
    });
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
