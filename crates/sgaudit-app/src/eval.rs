//! The `eval` use case: evaluate every policy against every security group and publish
//! one assessment result per (resource, policy) pair.

use crate::cancel::CancelToken;
use crate::error::{ErrorList, EvalError};
use crate::ports::{EvidenceSink, ProviderSession, ResourceSupplier};
use rayon::prelude::*;
use sgaudit_domain::{
    AssemblyInput, EvidenceContext, NormalizedResource, PolicyEvaluator, ResultAggregator,
    assemble, evaluate_policy, merge_configured_labels, normalize, stream_id,
};
use sgaudit_settings::ResolvedConfig;
use sgaudit_types::{
    FindingStatus, PolicyPath, RunCounts, RunReport, RunStatus, SCHEMA_RUN_REPORT_V1,
    StreamEntry, Submission, ToolMeta,
};
use time::OffsetDateTime;
use tracing::{debug, error, info, info_span, warn};

/// Input for the eval use case.
#[derive(Clone, Copy)]
pub struct EvalInput<'a> {
    /// Policies to evaluate, in order, against every resource.
    pub policies: &'a [PolicyPath],
    pub config: &'a ResolvedConfig,
    pub supplier: &'a dyn ResourceSupplier,
    pub evaluator: &'a dyn PolicyEvaluator,
    pub sink: &'a dyn EvidenceSink,
    pub cancel: &'a CancelToken,
}

/// Output from the eval use case.
#[derive(Clone, Debug)]
pub struct EvalOutput {
    pub status: RunStatus,
    /// Every failure of the run, in the order it was recorded.
    pub errors: ErrorList,
    pub report: RunReport,
}

impl EvalOutput {
    /// The combined error, if anything failed.
    pub fn error(&self) -> Option<&ErrorList> {
        (!self.errors.is_empty()).then_some(&self.errors)
    }
}

/// What one resource's pipeline produced.
#[derive(Default)]
struct ResourceOutcome {
    errors: Vec<EvalError>,
    counts: RunCounts,
    streams: Vec<StreamEntry>,
    /// At least one policy was not started because the run was cancelled.
    skipped: bool,
}

/// Run one evaluation. Always returns; failures are accumulated, never short-circuit.
pub fn run_eval(input: EvalInput<'_>) -> EvalOutput {
    let started_at = OffsetDateTime::now_utc();
    let mut errors = ErrorList::default();

    let session = match input.config.run.region() {
        Ok(region) => ProviderSession {
            region: Some(region.to_string()),
        },
        Err(err) => {
            error!(error = %err, "unable to establish provider session");
            errors.push(EvalError::Configuration(err));
            ProviderSession::default()
        }
    };

    let parallel = input.config.run.parallel().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to sequential evaluation");
        errors.push(EvalError::Configuration(err));
        false
    });

    let resources = fetch_resources(input.supplier, &session, &mut errors);
    info!(
        resources = resources.len(),
        policies = input.policies.len(),
        parallel,
        "starting evaluation"
    );

    let outcomes: Vec<ResourceOutcome> = if parallel {
        resources
            .par_iter()
            .map(|resource| evaluate_resource(resource, &input, started_at))
            .collect()
    } else {
        resources
            .iter()
            .map(|resource| evaluate_resource(resource, &input, started_at))
            .collect()
    };

    let mut counts = RunCounts {
        resources: resources.len() as u32,
        ..RunCounts::default()
    };
    let mut streams = Vec::new();
    let mut skipped = false;
    for outcome in outcomes {
        skipped |= outcome.skipped;
        errors.extend(outcome.errors);
        add_counts(&mut counts, &outcome.counts);
        streams.extend(outcome.streams);
    }

    if skipped {
        warn!("evaluation cancelled");
        errors.push(EvalError::Cancelled);
    }

    let status = if errors.is_empty() {
        RunStatus::Success
    } else {
        RunStatus::Failure
    };
    let finished_at = OffsetDateTime::now_utc();
    info!(
        status = ?status,
        errors = errors.len(),
        published = counts.published,
        "evaluation finished"
    );

    let report = RunReport {
        schema: SCHEMA_RUN_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "sgaudit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        status,
        counts,
        streams,
        errors: errors.iter().map(ToString::to_string).collect(),
    };

    EvalOutput {
        status,
        errors,
        report,
    }
}

/// Drain the supplier. Failures are recorded and whatever was yielded is still evaluated.
fn fetch_resources(
    supplier: &dyn ResourceSupplier,
    session: &ProviderSession,
    errors: &mut ErrorList,
) -> Vec<NormalizedResource> {
    let mut resources = Vec::new();
    for item in supplier.security_groups(session) {
        match item {
            Ok(group) => match normalize(&group) {
                Ok(resource) => resources.push(resource),
                Err(err) => {
                    error!(error = %err, "unable to normalize security group");
                    errors.push(EvalError::ResourceFetch {
                        message: err.to_string(),
                    });
                }
            },
            Err(err) => {
                error!(error = %format!("{err:#}"), "unable to get security groups");
                errors.push(EvalError::ResourceFetch {
                    message: format!("{err:#}"),
                });
            }
        }
    }
    resources
}

/// Evaluate every policy against one resource. Owns every result it builds.
fn evaluate_resource(
    resource: &NormalizedResource,
    input: &EvalInput<'_>,
    run_started: OffsetDateTime,
) -> ResourceOutcome {
    let _span = info_span!("resource", resource_id = %resource.id).entered();
    let mut out = ResourceOutcome::default();
    let context = EvidenceContext::for_security_group(resource);

    for policy in input.policies {
        if input.cancel.is_cancelled() {
            debug!(policy_path = %policy, "cancelled; not starting evaluation");
            out.skipped = true;
            break;
        }

        let labels =
            merge_configured_labels(&resource.labels, &input.config.overrides_for(policy));
        let eval_start = OffsetDateTime::now_utc();

        let verdicts = match evaluate_policy(input.evaluator, &resource.document, policy) {
            Ok(verdicts) => verdicts,
            Err(err) => {
                let message = format!("{err:#}");
                error!(policy_path = %policy, error = %message, "policy evaluation failed");
                out.errors.push(EvalError::PolicyEvaluation {
                    resource_id: resource.id.clone(),
                    policy_path: policy.clone(),
                    message,
                });
                continue;
            }
        };
        out.counts.evaluations += 1;

        let collected = OffsetDateTime::now_utc();
        let assembly = AssemblyInput {
            resource,
            policy_path: policy,
            labels: &labels,
            context: &context,
            collected,
        };

        let mut aggregator =
            ResultAggregator::new(input.config.run.title(), run_started).with_context(&context);
        for verdict in &verdicts {
            let set = assemble(verdict, &assembly);
            out.counts.observations += set.observations.len() as u32;
            for finding in &set.findings {
                match finding.status {
                    FindingStatus::Satisfied => out.counts.findings_satisfied += 1,
                    FindingStatus::NotSatisfied => out.counts.findings_not_satisfied += 1,
                }
            }
            out.counts.risks += set.risks.len() as u32;
            aggregator.add(set);
        }
        aggregator.log_evaluation(policy, &resource.id, eval_start, OffsetDateTime::now_utc());

        let stream = stream_id(&resource.resource_type, policy, &resource.id);
        let submission = Submission {
            stream_id: stream,
            labels,
            policy_path: policy.clone(),
            result: aggregator.finish(OffsetDateTime::now_utc()),
        };

        match input.sink.publish(&submission) {
            Ok(()) => {
                debug!(
                    policy_path = %policy,
                    stream_id = %stream,
                    artifacts = submission.result.artifact_count(),
                    "published assessment result"
                );
                out.counts.published += 1;
                out.streams.push(StreamEntry {
                    stream_id: stream,
                    resource_id: resource.id.clone(),
                    policy_path: policy.clone(),
                });
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(
                    policy_path = %policy,
                    stream_id = %stream,
                    error = %message,
                    "failed to publish assessment result"
                );
                out.errors.push(EvalError::Publish {
                    resource_id: resource.id.clone(),
                    policy_path: policy.clone(),
                    stream_id: stream,
                    message,
                });
            }
        }
    }

    out
}

fn add_counts(total: &mut RunCounts, part: &RunCounts) {
    total.evaluations += part.evaluations;
    total.observations += part.observations;
    total.findings_satisfied += part.findings_satisfied;
    total.findings_not_satisfied += part.findings_not_satisfied;
    total.risks += part.risks;
    total.published += part.published;
}
