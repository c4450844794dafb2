//! Record coverage: which boundaries can actually be clicked through to a record.

use crate::fetch::{record_location, ResourceLocation};
use crate::types::Boundary;
use serde::Serialize;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct AuditReport {
    pub boundaries: usize,
    /// Ids whose region code is not in the table (or that have no id at all).
    pub unresolved: Vec<String>,
    /// Record paths that do not exist. Only checked for filesystem bases.
    pub missing_records: Vec<String>,
}

pub async fn audit_records(boundaries: &[Boundary], records: &ResourceLocation) -> AuditReport {
    let mut report = AuditReport {
        boundaries: boundaries.len(),
        ..Default::default()
    };

    for (i, boundary) in boundaries.iter().enumerate() {
        let (Some(id), Some(state)) = (boundary.id.as_deref(), boundary.state) else {
            report
                .unresolved
                .push(boundary.id.clone().unwrap_or_else(|| format!("<layer {}>", i)));
            continue;
        };
        if let Ok(ResourceLocation::Path(path)) = record_location(records, id, state) {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                report.missing_records.push(path.display().to_string());
            }
        }
    }
    report
}
