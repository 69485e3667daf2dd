use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `sgaudit.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SgauditConfigV1 {
    /// Optional schema string for tooling (`sgaudit.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Flat run configuration (`region`, `title`, `parallel`). Values are validated on use.
    #[serde(default)]
    pub config: BTreeMap<String, String>,

    /// Policy evaluator command; the policy path is appended as the final argument.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluator: Vec<String>,

    /// Extra labels applied to every resource.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Map of policy path -> config.
    #[serde(default)]
    pub policies: BTreeMap<String, PolicyConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyConfig {
    /// Labels merged over the resource labels for this policy only.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}
