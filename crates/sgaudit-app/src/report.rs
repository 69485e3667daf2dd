use anyhow::Context;
use sgaudit_types::{RunReport, RunStatus, SCHEMA_RUN_REPORT_V1};

pub fn serialize_report(report: &RunReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize run report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<RunReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_RUN_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    serde_json::from_value(value).context("parse sgaudit run report")
}

/// Map run status to exit code: 0 = success, 1 = failure.
pub fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Success => 0,
        RunStatus::Failure => 1,
    }
}
