use sgaudit_types::ids;
use std::collections::BTreeMap;
use std::time::Duration;

pub const KEY_REGION: &str = "region";
pub const KEY_TITLE: &str = "title";
pub const KEY_PARALLEL: &str = "parallel";
pub const KEY_EVALUATOR_TIMEOUT: &str = "evaluator_timeout";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no region configured (set `region` in [config], pass --region, or export AWS_REGION)")]
    MissingRegion,
    #[error("invalid region {0:?} (expected lowercase letters, digits and hyphens, e.g. eu-west-2)")]
    InvalidRegion(String),
    #[error("invalid value {value:?} for {key} (expected true or false)")]
    InvalidBool { key: String, value: String },
    #[error("invalid value {value:?} for {key} (expected a positive number of seconds)")]
    InvalidSeconds { key: String, value: String },
}

/// Flat string-keyed run configuration.
///
/// Nothing is validated when the map is built; each accessor checks its own key when called.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunConfig {
    values: BTreeMap<String, String>,
}

impl RunConfig {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Target region for the provider session.
    pub fn region(&self) -> Result<&str, ConfigError> {
        let region = self
            .get(KEY_REGION)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(ConfigError::MissingRegion)?;
        if is_valid_region(region) {
            Ok(region)
        } else {
            Err(ConfigError::InvalidRegion(region.to_string()))
        }
    }

    /// Title given to every assessment result.
    pub fn title(&self) -> &str {
        self.get(KEY_TITLE)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(ids::DEFAULT_RESULT_TITLE)
    }

    /// Whether resources are evaluated on a worker pool. Defaults to false.
    pub fn parallel(&self) -> Result<bool, ConfigError> {
        match self.get(KEY_PARALLEL).map(str::trim) {
            None | Some("") => Ok(false),
            Some("true" | "1" | "yes") => Ok(true),
            Some("false" | "0" | "no") => Ok(false),
            Some(other) => Err(ConfigError::InvalidBool {
                key: KEY_PARALLEL.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Deadline for one policy evaluation, in whole seconds. `None` means no deadline.
    pub fn evaluator_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match self.get(KEY_EVALUATOR_TIMEOUT).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
                _ => Err(ConfigError::InvalidSeconds {
                    key: KEY_EVALUATOR_TIMEOUT.to_string(),
                    value: raw.to_string(),
                }),
            },
        }
    }
}

fn is_valid_region(region: &str) -> bool {
    let mut parts = region.split('-');
    let Some(first) = parts.next() else {
        return false;
    };
    let rest: Vec<&str> = parts.collect();
    !first.is_empty()
        && first.chars().all(|c| c.is_ascii_lowercase())
        && rest.len() >= 2
        && rest
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        && rest
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()))
}
