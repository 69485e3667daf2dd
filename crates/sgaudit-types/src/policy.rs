use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filesystem-like reference to a policy bundle, as supplied by the caller.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PolicyPath(String);

impl PolicyPath {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaced package identifier of a policy, e.g. `data.aws.security_group.deny_ssh`.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PolicyPackage(String);

impl PolicyPackage {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The package without the evaluator's `data.` root segment.
    pub fn pure(&self) -> &str {
        self.0.strip_prefix("data.").unwrap_or(&self.0)
    }
}

impl fmt::Display for PolicyPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pure())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyRef {
    pub package: PolicyPackage,
    /// Source file the package was loaded from, when the evaluator reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Result of evaluating one policy against one resource document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub policy: PolicyRef,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub risks: Vec<RiskEntry>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RiskEntry {
    pub title: String,
    pub description: String,
    pub statement: String,
    #[serde(default)]
    pub links: Vec<RiskLink>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RiskLink {
    pub url: String,
    pub text: String,
}
