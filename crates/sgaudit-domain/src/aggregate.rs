//! Result aggregator: one assessment result per (resource, policy) pair.

use crate::assemble::EvidenceSet;
use crate::context::EvidenceContext;
use sgaudit_types::{AssessmentResult, LogEntry, PolicyPath};
use time::OffsetDateTime;

/// Accumulates the artifacts of one (resource, policy) pair.
///
/// Owned by exactly one evaluation; consumed by [`ResultAggregator::finish`].
#[derive(Clone, Debug)]
pub struct ResultAggregator {
    result: AssessmentResult,
}

impl ResultAggregator {
    /// Start a result stamped with the start of the overall run.
    pub fn new(title: impl Into<String>, run_started: OffsetDateTime) -> Self {
        Self {
            result: AssessmentResult {
                title: title.into(),
                start: run_started,
                end: None,
                observations: Vec::new(),
                findings: Vec::new(),
                risks: Vec::new(),
                logs: Vec::new(),
                components: Vec::new(),
                inventory: Vec::new(),
            },
        }
    }

    pub fn with_context(mut self, context: &EvidenceContext) -> Self {
        self.result.components = context.components.clone();
        self.result.inventory = context.inventory.clone();
        self
    }

    pub fn add(&mut self, set: EvidenceSet) {
        self.result.observations.extend(set.observations);
        self.result.findings.extend(set.findings);
        self.result.risks.extend(set.risks);
    }

    /// Record that one (resource, policy) evaluation completed.
    pub fn log_evaluation(
        &mut self,
        policy_path: &PolicyPath,
        resource_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) {
        self.result.logs.push(LogEntry {
            title: format!("Evaluated {policy_path} against {resource_id}"),
            description: None,
            start,
            end,
        });
    }

    pub fn artifact_count(&self) -> usize {
        self.result.artifact_count()
    }

    /// Stamp the end time and hand the result over.
    pub fn finish(mut self, end: OffsetDateTime) -> AssessmentResult {
        self.result.end = Some(end);
        self.result
    }
}
