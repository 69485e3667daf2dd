//! Evidence assembler: verdicts -> observations, findings, risks.

use crate::context::EvidenceContext;
use crate::labels::{merge_configured_labels, merge_labels};
use crate::model::NormalizedResource;
use sgaudit_types::{
    Finding, FindingStatus, Labels, Link, Observation, PolicyPath, Risk, RiskEntry, Verdict, ids,
};
use time::{Date, Duration, Month, OffsetDateTime};
use uuid::Uuid;

/// Everything about one (resource, policy) pair the assembler needs besides the verdict.
#[derive(Clone, Copy, Debug)]
pub struct AssemblyInput<'a> {
    pub resource: &'a NormalizedResource,
    pub policy_path: &'a PolicyPath,
    /// Base labels already merged with the per-policy overrides.
    pub labels: &'a Labels,
    pub context: &'a EvidenceContext,
    pub collected: OffsetDateTime,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvidenceSet {
    pub observations: Vec<Observation>,
    pub findings: Vec<Finding>,
    pub risks: Vec<Risk>,
}

impl EvidenceSet {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.findings.is_empty() && self.risks.is_empty()
    }
}

/// Assemble the evidence for one verdict, with fresh random observation ids.
pub fn assemble(verdict: &Verdict, input: &AssemblyInput<'_>) -> EvidenceSet {
    assemble_with_ids(verdict, input, Uuid::new_v4)
}

/// Assemble the evidence for one verdict, drawing observation ids from `next_id`.
///
/// Always one observation. A passing verdict yields one `satisfied` finding; a failing one
/// yields one `not-satisfied` finding per violation, each pointing back at the observation.
/// Risks are copied through regardless of the outcome.
pub fn assemble_with_ids(
    verdict: &Verdict,
    input: &AssemblyInput<'_>,
    mut next_id: impl FnMut() -> Uuid,
) -> EvidenceSet {
    let package = verdict.policy.package.pure();
    let resource_id = input.resource.id.as_str();
    let derived = merge_labels(&input.resource.labels, &evaluation_labels(verdict, input));
    let labels = merge_configured_labels(&derived, input.labels);

    let (title, description) = if verdict.passed() {
        (
            format!("Validation on {package} passed."),
            format!(
                "Observed no violations on the {package} policy for security group {resource_id}."
            ),
        )
    } else {
        (
            format!("Validation on {package} failed."),
            format!(
                "Observed {} violation(s) on the {package} policy for security group {resource_id}.",
                verdict.violations.len()
            ),
        )
    };

    // The id must exist before any finding can reference it.
    let observation = Observation {
        uuid: next_id(),
        title,
        description,
        collected: input.collected,
        expires: expiry_for(input.collected),
        evidence: format!(
            "Policy {package} ({}) was evaluated against the normalized configuration of security group {resource_id}.",
            input.policy_path
        ),
        labels: labels.clone(),
        subjects: input.context.subjects.clone(),
        origins: input.context.origins.clone(),
    };

    let findings = if verdict.passed() {
        vec![Finding {
            title: format!("No violations found on {package}"),
            description: format!(
                "No violations were found on the {package} policy for security group {resource_id}."
            ),
            remarks: None,
            status: FindingStatus::Satisfied,
            labels: labels.clone(),
            related_observation: None,
            subjects: input.context.subjects.clone(),
            origins: input.context.origins.clone(),
        }]
    } else {
        verdict
            .violations
            .iter()
            .map(|violation| Finding {
                title: violation.title.clone(),
                description: violation.description.clone(),
                remarks: violation.remarks.clone(),
                status: FindingStatus::NotSatisfied,
                labels: labels.clone(),
                related_observation: Some(observation.uuid),
                subjects: input.context.subjects.clone(),
                origins: input.context.origins.clone(),
            })
            .collect()
    };

    EvidenceSet {
        observations: vec![observation],
        findings,
        risks: verdict.risks.iter().map(risk_from_entry).collect(),
    }
}

fn evaluation_labels(verdict: &Verdict, input: &AssemblyInput<'_>) -> Labels {
    let mut labels = Labels::new();
    labels.insert(
        ids::LABEL_POLICY.to_string(),
        verdict.policy.package.pure().to_string(),
    );
    labels.insert(
        ids::LABEL_POLICY_PATH.to_string(),
        input.policy_path.as_str().to_string(),
    );
    labels.insert(ids::LABEL_SERVICE.to_string(), ids::SERVICE_EC2.to_string());
    labels.insert(
        ids::LABEL_TYPE.to_string(),
        input.resource.resource_type.clone(),
    );
    labels.insert(ids::LABEL_GROUP_ID.to_string(), input.resource.id.clone());
    labels
}

fn risk_from_entry(entry: &RiskEntry) -> Risk {
    Risk {
        title: entry.title.clone(),
        description: entry.description.clone(),
        statement: entry.statement.clone(),
        links: entry
            .links
            .iter()
            .map(|l| Link {
                href: l.url.clone(),
                rel: None,
                text: Some(l.text.clone()),
            })
            .collect(),
    }
}

/// Observations expire one calendar month after collection.
///
/// The day is clamped to the end of the target month (Jan 31 -> Feb 28/29).
pub fn expiry_for(collected: OffsetDateTime) -> OffsetDateTime {
    let date = collected.date();
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        m => (date.year(), m.next()),
    };
    let day = date.day().min(month.length(year));
    match Date::from_calendar_date(year, month, day) {
        Ok(next) => collected.replace_date(next),
        // Only reachable at the edge of the representable calendar.
        Err(_) => collected + Duration::days(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;
    use crate::test_support::{open_ssh_group, verdict};
    use time::macros::datetime;

    fn collected() -> OffsetDateTime {
        datetime!(2025-03-14 09:30:00 UTC)
    }

    fn with_input<T>(f: impl FnOnce(&AssemblyInput<'_>) -> T) -> T {
        let resource = normalize(&open_ssh_group()).expect("normalize");
        let context = EvidenceContext::for_security_group(&resource);
        let path = PolicyPath::new("policies/deny_ssh");
        let labels = resource.labels.clone();
        let input = AssemblyInput {
            resource: &resource,
            policy_path: &path,
            labels: &labels,
            context: &context,
            collected: collected(),
        };
        f(&input)
    }

    #[test]
    fn passing_verdict_yields_one_satisfied_finding() {
        let set = with_input(|input| assemble(&verdict("data.aws.sg.deny_ssh", 0, 0), input));

        assert_eq!(set.observations.len(), 1);
        assert_eq!(set.findings.len(), 1);
        assert!(set.risks.is_empty());

        let obs = &set.observations[0];
        assert_eq!(obs.title, "Validation on aws.sg.deny_ssh passed.");
        assert!(obs.description.contains("no violations"));
        assert!(obs.description.contains("sg-0123456789abcdef0"));

        let finding = &set.findings[0];
        assert_eq!(finding.status, FindingStatus::Satisfied);
        assert_eq!(finding.title, "No violations found on aws.sg.deny_ssh");
        assert_eq!(finding.related_observation, None);
    }

    #[test]
    fn failing_verdict_links_every_finding_to_one_observation() {
        let set = with_input(|input| assemble(&verdict("data.aws.sg.deny_ssh", 3, 0), input));

        assert_eq!(set.observations.len(), 1);
        assert_eq!(set.findings.len(), 3);
        let obs = &set.observations[0];
        assert_eq!(obs.title, "Validation on aws.sg.deny_ssh failed.");
        assert!(obs.description.starts_with("Observed 3 violation(s)"));

        for (i, finding) in set.findings.iter().enumerate() {
            assert_eq!(finding.status, FindingStatus::NotSatisfied);
            assert_eq!(finding.related_observation, Some(obs.uuid));
            assert_eq!(finding.title, format!("violation {i}"));
            assert_eq!(finding.remarks.as_deref(), Some(format!("remarks {i}").as_str()));
        }
    }

    #[test]
    fn risks_are_emitted_regardless_of_outcome() {
        for violations in [0, 2] {
            let set = with_input(|input| {
                assemble(&verdict("data.aws.sg.deny_ssh", violations, 2), input)
            });
            assert_eq!(set.risks.len(), 2);
            let risk = &set.risks[1];
            assert_eq!(risk.title, "risk 1");
            assert_eq!(risk.links.len(), 1);
            assert_eq!(risk.links[0].href, "https://example.com/risk/1");
            assert_eq!(risk.links[0].text.as_deref(), Some("reference 1"));
        }
    }

    #[test]
    fn artifacts_carry_identity_labels() {
        let set = with_input(|input| assemble(&verdict("data.aws.sg.deny_ssh", 1, 0), input));
        for labels in set
            .observations
            .iter()
            .map(|o| &o.labels)
            .chain(set.findings.iter().map(|f| &f.labels))
        {
            assert_eq!(labels["_policy"], "aws.sg.deny_ssh");
            assert_eq!(labels["_policy_path"], "policies/deny_ssh");
            assert_eq!(labels["service"], "ec2");
            assert_eq!(labels["type"], "security-group");
            assert_eq!(labels["group-id"], "sg-0123456789abcdef0");
            assert_eq!(labels["provider"], "aws");
        }
    }

    #[test]
    fn policy_overrides_win_over_evaluation_labels() {
        let resource = normalize(&open_ssh_group()).expect("normalize");
        let context = EvidenceContext::for_security_group(&resource);
        let path = PolicyPath::new("policies/deny_ssh");
        let mut labels = resource.labels.clone();
        labels.insert("service".to_string(), "vpc".to_string());
        let input = AssemblyInput {
            resource: &resource,
            policy_path: &path,
            labels: &labels,
            context: &context,
            collected: collected(),
        };
        let set = assemble(&verdict("data.p", 0, 0), &input);
        assert_eq!(set.findings[0].labels["service"], "vpc");
    }

    #[test]
    fn configured_labels_cannot_rewrite_artifact_identity() {
        let resource = normalize(&open_ssh_group()).expect("normalize");
        let context = EvidenceContext::for_security_group(&resource);
        let path = PolicyPath::new("policies/deny_ssh");
        let mut labels = resource.labels.clone();
        for (k, v) in [("group-id", "shared"), ("_policy", "other"), ("type", "x")] {
            labels.insert(k.to_string(), v.to_string());
        }
        labels.insert("team".to_string(), "network".to_string());
        let input = AssemblyInput {
            resource: &resource,
            policy_path: &path,
            labels: &labels,
            context: &context,
            collected: collected(),
        };

        let set = assemble(&verdict("data.aws.sg.deny_ssh", 1, 0), &input);

        for labels in set
            .observations
            .iter()
            .map(|o| &o.labels)
            .chain(set.findings.iter().map(|f| &f.labels))
        {
            assert_eq!(labels["group-id"], "sg-0123456789abcdef0");
            assert_eq!(labels["_policy"], "aws.sg.deny_ssh");
            assert_eq!(labels["type"], "security-group");
            assert_eq!(labels["_vpc-id"], "vpc-0a1b2c3d");
            assert_eq!(labels["team"], "network");
        }
    }

    #[test]
    fn shapes_are_deterministic_apart_from_ids() {
        let (a, b) = with_input(|input| {
            let v = verdict("data.aws.sg.deny_ssh", 2, 1);
            let mut n = 0u128;
            let a = assemble_with_ids(&v, input, || {
                n += 1;
                Uuid::from_u128(n)
            });
            let b = assemble_with_ids(&v, input, || Uuid::from_u128(1));
            (a, b)
        });
        assert_eq!(a, b);
    }

    #[test]
    fn expiry_is_one_calendar_month_later() {
        assert_eq!(
            expiry_for(datetime!(2025-03-14 09:30:00 UTC)),
            datetime!(2025-04-14 09:30:00 UTC)
        );
        assert_eq!(
            expiry_for(datetime!(2025-12-20 00:00:00 UTC)),
            datetime!(2026-01-20 00:00:00 UTC)
        );
        assert_eq!(
            expiry_for(datetime!(2025-01-31 12:00:00 UTC)),
            datetime!(2025-02-28 12:00:00 UTC)
        );
        assert_eq!(
            expiry_for(datetime!(2024-01-31 12:00:00 UTC)),
            datetime!(2024-02-29 12:00:00 UTC)
        );
    }

    #[test]
    fn observation_carries_context() {
        let set = with_input(|input| assemble(&verdict("data.p", 0, 0), input));
        let obs = &set.observations[0];
        assert_eq!(obs.collected, collected());
        assert_eq!(obs.expires, datetime!(2025-04-14 09:30:00 UTC));
        assert_eq!(obs.subjects.len(), 2);
        assert_eq!(obs.origins.len(), 2);
        assert!(obs.evidence.contains("policies/deny_ssh"));
    }
}
