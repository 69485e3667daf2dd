use sgaudit_settings::ConfigError;
use sgaudit_types::{PolicyPath, StreamId};
use std::fmt;

/// One failure recorded during a run. None of these stop the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("resource fetch failed: {message}")]
    ResourceFetch { message: String },
    #[error("policy evaluation failed for {resource_id} with {policy_path}: {message}")]
    PolicyEvaluation {
        resource_id: String,
        policy_path: PolicyPath,
        message: String,
    },
    #[error("publish failed for {resource_id} with {policy_path} (stream {stream_id}): {message}")]
    Publish {
        resource_id: String,
        policy_path: PolicyPath,
        stream_id: StreamId,
        message: String,
    },
    #[error("run cancelled before all evaluations started")]
    Cancelled,
}

impl EvalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::ResourceFetch { .. } => "resource_fetch",
            Self::PolicyEvaluation { .. } => "policy_evaluation",
            Self::Publish { .. } => "publish",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Ordered list of every failure in a run, surfaced as one combined error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<EvalError>);

impl ErrorList {
    pub fn push(&mut self, err: EvalError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvalError> {
        self.0.iter()
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    pub fn into_vec(self) -> Vec<EvalError> {
        self.0
    }
}

impl Extend<EvalError> for ErrorList {
    fn extend<I: IntoIterator<Item = EvalError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a EvalError;
    type IntoIter = std::slice::Iter<'a, EvalError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
