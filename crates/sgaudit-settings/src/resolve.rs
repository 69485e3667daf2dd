use crate::model::SgauditConfigV1;
use crate::run_config::{KEY_EVALUATOR_TIMEOUT, KEY_PARALLEL, KEY_REGION, RunConfig};
use sgaudit_types::{Labels, PolicyPath};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub parallel: Option<bool>,
    /// Evaluator deadline in seconds.
    pub evaluator_timeout: Option<u64>,
    /// Region from the environment (`AWS_REGION`); used only when nothing else sets one.
    pub env_region: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedConfig {
    pub run: RunConfig,
    pub evaluator: Vec<String>,
    pub labels: Labels,
    pub policy_labels: BTreeMap<String, Labels>,
}

impl ResolvedConfig {
    /// Labels layered over a resource's own labels when evaluating `policy`:
    /// the global `[labels]` table, then that policy's own labels.
    pub fn overrides_for(&self, policy: &PolicyPath) -> Labels {
        let mut labels = self.labels.clone();
        if let Some(own) = self.policy_labels.get(policy.as_str()) {
            for (k, v) in own {
                labels.insert(k.clone(), v.clone());
            }
        }
        labels
    }
}

pub fn resolve_config(cfg: SgauditConfigV1, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != "sgaudit.config.v1"
    {
        anyhow::bail!("unsupported config schema: {schema} (expected sgaudit.config.v1)");
    }

    let mut values = cfg.config;

    if let Some(region) = overrides.region {
        values.insert(KEY_REGION.to_string(), region);
    } else if !values.contains_key(KEY_REGION)
        && let Some(region) = overrides.env_region
    {
        values.insert(KEY_REGION.to_string(), region);
    }

    if let Some(parallel) = overrides.parallel {
        values.insert(KEY_PARALLEL.to_string(), parallel.to_string());
    }

    if let Some(secs) = overrides.evaluator_timeout {
        values.insert(KEY_EVALUATOR_TIMEOUT.to_string(), secs.to_string());
    }

    if cfg.evaluator.first().is_some_and(|p| p.trim().is_empty()) {
        anyhow::bail!("evaluator command must start with a program name");
    }

    Ok(ResolvedConfig {
        run: RunConfig::new(values),
        evaluator: cfg.evaluator,
        labels: cfg.labels,
        policy_labels: cfg
            .policies
            .into_iter()
            .map(|(path, pc)| (path, pc.labels))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    const CONFIG: &str = r#"
schema = "sgaudit.config.v1"
evaluator = ["opa-verdicts", "--bundle"]

[config]
region = "eu-west-1"
title = "Nightly network review"

[labels]
team = "network"

[policies."policies/deny_ssh".labels]
team = "security"
control = "SC-7"
"#;

    #[test]
    fn parses_and_resolves_full_config() {
        let cfg = parse_config_toml(CONFIG).expect("parse");
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");

        assert_eq!(resolved.run.region(), Ok("eu-west-1"));
        assert_eq!(resolved.run.title(), "Nightly network review");
        assert_eq!(resolved.evaluator, vec!["opa-verdicts", "--bundle"]);

        let ssh = resolved.overrides_for(&PolicyPath::new("policies/deny_ssh"));
        assert_eq!(ssh["team"], "security");
        assert_eq!(ssh["control"], "SC-7");

        let other = resolved.overrides_for(&PolicyPath::new("policies/other"));
        assert_eq!(other["team"], "network");
        assert!(!other.contains_key("control"));
    }

    #[test]
    fn region_precedence_cli_then_file_then_env() {
        let cfg = parse_config_toml(CONFIG).expect("parse");
        let resolved = resolve_config(
            cfg.clone(),
            Overrides {
                region: Some("us-east-2".to_string()),
                env_region: Some("ap-south-1".to_string()),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(resolved.run.region(), Ok("us-east-2"));

        let resolved = resolve_config(
            cfg,
            Overrides {
                env_region: Some("ap-south-1".to_string()),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(resolved.run.region(), Ok("eu-west-1"));

        let resolved = resolve_config(
            SgauditConfigV1::default(),
            Overrides {
                env_region: Some("ap-south-1".to_string()),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(resolved.run.region(), Ok("ap-south-1"));
    }

    #[test]
    fn invalid_values_do_not_fail_resolution() {
        let cfg = parse_config_toml("[config]\nregion = \"???\"\nparallel = \"maybe\"\n")
            .expect("parse");
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert!(resolved.run.region().is_err());
        assert!(resolved.run.parallel().is_err());
    }

    #[test]
    fn parallel_override() {
        let resolved = resolve_config(
            SgauditConfigV1::default(),
            Overrides {
                parallel: Some(true),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(resolved.run.parallel(), Ok(true));
    }

    #[test]
    fn evaluator_timeout_override_wins_over_file() {
        let cfg = parse_config_toml("[config]\nevaluator_timeout = \"60\"\n").expect("parse");
        let resolved = resolve_config(
            cfg,
            Overrides {
                evaluator_timeout: Some(5),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(
            resolved.run.evaluator_timeout(),
            Ok(Some(std::time::Duration::from_secs(5)))
        );
    }

    #[test]
    fn rejects_unknown_schema() {
        let cfg = parse_config_toml("schema = \"sgaudit.config.v9\"").expect("parse");
        assert!(resolve_config(cfg, Overrides::default()).is_err());
    }
}
