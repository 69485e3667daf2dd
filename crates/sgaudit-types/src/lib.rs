//! Stable DTOs and IDs used across the sgaudit workspace.
//!
//! This crate is intentionally boring:
//! - policy references and the verdicts an evaluator returns
//! - evidence artifacts (observations, findings, risks) and their context
//! - the per-pair assessment result and the run report
//! - stable label keys and title templates

#![forbid(unsafe_code)]

pub mod assessment;
pub mod evidence;
pub mod ids;
pub mod policy;
pub mod report;

use std::collections::BTreeMap;

/// String-keyed labels attached to artifacts and used to seed identifiers.
///
/// Ordered so that serialization and identifier seeding are deterministic.
pub type Labels = BTreeMap<String, String>;

pub use uuid::Uuid;

pub use assessment::{AssessmentResult, LogEntry, StreamId, Submission};
pub use evidence::{
    Component, Finding, FindingStatus, InventoryItem, Link, Observation, OriginActor, Property,
    Risk, Subject, SubjectType,
};
pub use policy::{PolicyPackage, PolicyPath, PolicyRef, RiskEntry, RiskLink, Verdict, Violation};
pub use report::{
    RunCounts, RunReport, RunStatus, SCHEMA_RUN_REPORT_V1, StreamEntry, ToolMeta,
};
