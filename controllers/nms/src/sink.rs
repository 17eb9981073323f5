//! Outward effects
//!
//! Relation data updates, unit status and workload version are handed back to
//! the host as JSON lines on stdout. Diagnostics go to stderr through tracing.

use crate::error::ControllerError;
use crate::status::UnitStatus;
use relations::Databag;
use serde::Serialize;
use std::io::Write;

/// One effect the host must apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum OutwardRecord {
    /// Merge `data` into this application's databag of one relation
    RelationData {
        relation: String,
        relation_id: u64,
        data: Databag,
    },
    UnitStatus {
        status: UnitStatus,
    },
    WorkloadVersion {
        version: String,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, record: OutwardRecord) -> Result<(), ControllerError>;
}

/// Writes each record as one JSON line on stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, record: OutwardRecord) -> Result<(), ControllerError> {
        let line = serde_json::to_string(&record)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }
}
