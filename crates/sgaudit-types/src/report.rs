use crate::{PolicyPath, StreamId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for run reports.
pub const SCHEMA_RUN_REPORT_V1: &str = "sgaudit.run.v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunCounts {
    pub resources: u32,
    pub evaluations: u32,
    pub observations: u32,
    pub findings_satisfied: u32,
    pub findings_not_satisfied: u32,
    pub risks: u32,
    pub published: u32,
}

/// One published (resource, policy) stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StreamEntry {
    pub stream_id: StreamId,
    pub resource_id: String,
    pub policy_path: PolicyPath,
}

/// Summary of one evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub status: RunStatus,
    pub counts: RunCounts,
    #[serde(default)]
    pub streams: Vec<StreamEntry>,
    #[serde(default)]
    pub errors: Vec<String>,
}
