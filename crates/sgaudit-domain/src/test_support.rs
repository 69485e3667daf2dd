use crate::evaluator::PolicyEvaluator;
use crate::model::{IpPermission, IpRange, ResourceDocument, SecurityGroup, Tag};
use sgaudit_types::{PolicyPackage, PolicyPath, PolicyRef, RiskEntry, RiskLink, Verdict, Violation};
use std::collections::BTreeMap;

pub fn security_group(id: &str, vpc: Option<&str>) -> SecurityGroup {
    SecurityGroup {
        group_id: Some(id.to_string()),
        vpc_id: vpc.map(|v| v.to_string()),
        ..SecurityGroup::default()
    }
}

pub fn ingress(from: i32, to: i32, cidr: &str) -> IpPermission {
    IpPermission {
        ip_protocol: Some("tcp".to_string()),
        from_port: Some(from),
        to_port: Some(to),
        ip_ranges: Some(vec![IpRange {
            cidr_ip: Some(cidr.to_string()),
            description: None,
        }]),
        ..IpPermission::default()
    }
}

pub fn open_ssh_group() -> SecurityGroup {
    SecurityGroup {
        group_id: Some("sg-0123456789abcdef0".to_string()),
        group_name: Some("bastion".to_string()),
        description: Some("bastion hosts".to_string()),
        owner_id: Some("123456789012".to_string()),
        vpc_id: Some("vpc-0a1b2c3d".to_string()),
        security_group_arn: None,
        ip_permissions: Some(vec![
            ingress(22, 22, "0.0.0.0/0"),
            ingress(443, 443, "10.0.0.0/8"),
        ]),
        ip_permissions_egress: Some(vec![]),
        tags: Some(vec![Tag {
            key: Some("env".to_string()),
            value: Some("prod".to_string()),
        }]),
    }
}

/// A verdict with `violations` numbered violations and `risks` numbered risks.
pub fn verdict(package: &str, violations: usize, risks: usize) -> Verdict {
    Verdict {
        policy: PolicyRef {
            package: PolicyPackage::new(package),
            file: None,
        },
        violations: (0..violations)
            .map(|i| Violation {
                title: format!("violation {i}"),
                description: format!("description {i}"),
                remarks: Some(format!("remarks {i}")),
            })
            .collect(),
        risks: (0..risks)
            .map(|i| RiskEntry {
                title: format!("risk {i}"),
                description: format!("risk description {i}"),
                statement: format!("statement {i}"),
                links: vec![RiskLink {
                    url: format!("https://example.com/risk/{i}"),
                    text: format!("reference {i}"),
                }],
            })
            .collect(),
    }
}

/// Evaluator returning canned verdicts per policy path; unknown paths fail.
#[derive(Default)]
pub struct ScriptedEvaluator {
    scripts: BTreeMap<String, Vec<Verdict>>,
}

impl ScriptedEvaluator {
    pub fn with(mut self, policy: &str, verdicts: Vec<Verdict>) -> Self {
        self.scripts.insert(policy.to_string(), verdicts);
        self
    }
}

impl PolicyEvaluator for ScriptedEvaluator {
    fn evaluate(
        &self,
        _document: &ResourceDocument,
        policy: &PolicyPath,
    ) -> anyhow::Result<Vec<Verdict>> {
        match self.scripts.get(policy.as_str()) {
            Some(verdicts) => Ok(verdicts.clone()),
            None => anyhow::bail!("no such policy bundle"),
        }
    }
}
