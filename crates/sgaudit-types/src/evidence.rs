use crate::Labels;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A record that one policy was evaluated against one resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Observation {
    pub uuid: Uuid,
    pub title: String,
    pub description: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub collected: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
    /// Human-readable account of what was evaluated and how.
    pub evidence: String,
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<OriginActor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FindingStatus {
    Satisfied,
    NotSatisfied,
}

/// A pass/fail statement against one check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub status: FindingStatus,
    pub labels: Labels,
    /// Observation that reported the violation set this finding belongs to.
    /// Only present for `not-satisfied` findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_observation: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<OriginActor>,
}

/// A disclosed risk, independent of the pass/fail outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Risk {
    pub title: String,
    pub description: String,
    pub statement: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectType {
    Component,
    InventoryItem,
}

/// Reference to what an observation or finding is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Subject {
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    pub identifier: String,
}

/// Who produced the evidence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OriginActor {
    pub title: String,
    /// `assessment-platform` or `tool`.
    #[serde(rename = "type")]
    pub actor_type: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Component {
    pub identifier: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub title: String,
    pub description: String,
    pub purpose: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InventoryItem {
    pub identifier: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    #[serde(default)]
    pub props: Vec<Property>,
    /// Identifiers of the components this item implements.
    #[serde(default)]
    pub implemented_components: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(FindingStatus::NotSatisfied).expect("serialize"),
            serde_json::json!("not-satisfied")
        );
        assert_eq!(
            serde_json::to_value(FindingStatus::Satisfied).expect("serialize"),
            serde_json::json!("satisfied")
        );
    }

    #[test]
    fn satisfied_finding_omits_observation_reference() {
        let finding = Finding {
            title: "No violations found on aws.sg.deny_ssh".to_string(),
            description: String::new(),
            remarks: None,
            status: FindingStatus::Satisfied,
            labels: Labels::new(),
            related_observation: None,
            subjects: Vec::new(),
            origins: Vec::new(),
        };
        let value = serde_json::to_value(&finding).expect("serialize");
        assert!(value.get("related_observation").is_none());
        assert!(value.get("remarks").is_none());
    }
}
