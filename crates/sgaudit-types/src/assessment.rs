use crate::{Component, Finding, InventoryItem, Labels, Observation, PolicyPath, Risk};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Deterministic identifier grouping successive results for one (resource, policy) pair.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct StreamId(Uuid);

impl StreamId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

/// Aggregate of the artifacts produced for one (resource, policy) pair within a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentResult {
    pub title: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inventory: Vec<InventoryItem>,
}

impl AssessmentResult {
    pub fn artifact_count(&self) -> usize {
        self.observations.len() + self.findings.len() + self.risks.len()
    }
}

/// What is handed to the evidence sink for one (resource, policy) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Submission {
    pub stream_id: StreamId,
    pub labels: Labels,
    pub policy_path: PolicyPath,
    pub result: AssessmentResult,
}
