//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Stream id purity and sensitivity to each identity field
//! - Label merge precedence
//! - Evidence cardinality and cross-references per verdict

use crate::assemble::{AssemblyInput, assemble};
use crate::context::EvidenceContext;
use crate::labels::merge_labels;
use crate::normalize;
use crate::stream::stream_id;
use crate::test_support::{security_group, verdict};
use proptest::prelude::*;
use sgaudit_types::{FindingStatus, Labels, PolicyPath};
use std::collections::HashSet;
use time::macros::datetime;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

fn arb_group_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("sg-[0-9a-f]{8,17}").unwrap()
}

fn arb_policy_path() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_]{1,12}(/[a-z_]{1,12}){0,3}").unwrap()
}

fn arb_labels() -> impl Strategy<Value = Labels> {
    prop::collection::btree_map("[a-z_-]{1,8}", "[ -~]{0,12}", 0..6)
}

// ============================================================================
// Stream ids
// ============================================================================

proptest! {
    #[test]
    fn stream_id_is_pure(id in arb_group_id(), path in arb_policy_path()) {
        let path = PolicyPath::new(path);
        prop_assert_eq!(
            stream_id("security-group", &path, &id),
            stream_id("security-group", &path, &id)
        );
    }

    #[test]
    fn stream_id_distinguishes_pairs(
        a in (arb_group_id(), arb_policy_path()),
        b in (arb_group_id(), arb_policy_path()),
    ) {
        prop_assume!(a != b);
        let ida = stream_id("security-group", &PolicyPath::new(a.1.clone()), &a.0);
        let idb = stream_id("security-group", &PolicyPath::new(b.1.clone()), &b.0);
        prop_assert_ne!(ida, idb);
    }
}

// ============================================================================
// Label merge
// ============================================================================

proptest! {
    #[test]
    fn merge_prefers_overrides(base in arb_labels(), overrides in arb_labels()) {
        let merged = merge_labels(&base, &overrides);
        for (k, v) in &overrides {
            prop_assert_eq!(merged.get(k), Some(v));
        }
        for (k, v) in &base {
            if !overrides.contains_key(k) {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }
        prop_assert!(merged.len() <= base.len() + overrides.len());
    }
}

// ============================================================================
// Evidence cardinality
// ============================================================================

proptest! {
    #[test]
    fn evidence_cardinality_matches_verdict(violations in 0usize..6, risks in 0usize..4) {
        let resource = normalize(&security_group("sg-abc", Some("vpc-1"))).unwrap();
        let context = EvidenceContext::for_security_group(&resource);
        let path = PolicyPath::new("policies/p");
        let input = AssemblyInput {
            resource: &resource,
            policy_path: &path,
            labels: &resource.labels,
            context: &context,
            collected: datetime!(2025-06-01 00:00:00 UTC),
        };

        let set = assemble(&verdict("data.p", violations, risks), &input);

        prop_assert_eq!(set.observations.len(), 1);
        prop_assert_eq!(set.risks.len(), risks);
        let obs_id = set.observations[0].uuid;
        if violations == 0 {
            prop_assert_eq!(set.findings.len(), 1);
            prop_assert_eq!(set.findings[0].status, FindingStatus::Satisfied);
            prop_assert!(set.findings[0].related_observation.is_none());
        } else {
            prop_assert_eq!(set.findings.len(), violations);
            for f in &set.findings {
                prop_assert_eq!(f.status, FindingStatus::NotSatisfied);
                prop_assert_eq!(f.related_observation, Some(obs_id));
            }
        }
    }

    #[test]
    fn observation_ids_are_unique_across_verdicts(n in 1usize..20) {
        let resource = normalize(&security_group("sg-abc", None)).unwrap();
        let context = EvidenceContext::for_security_group(&resource);
        let path = PolicyPath::new("policies/p");
        let input = AssemblyInput {
            resource: &resource,
            policy_path: &path,
            labels: &resource.labels,
            context: &context,
            collected: datetime!(2025-06-01 00:00:00 UTC),
        };
        let ids: HashSet<_> = (0..n)
            .map(|i| assemble(&verdict("data.p", i % 3, 0), &input).observations[0].uuid)
            .collect();
        prop_assert_eq!(ids.len(), n);
    }
}
