//! Config parsing and run configuration resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;
mod run_config;

pub use model::{PolicyConfig, SgauditConfigV1};
pub use resolve::{Overrides, ResolvedConfig};
pub use run_config::{
    ConfigError, KEY_EVALUATOR_TIMEOUT, KEY_PARALLEL, KEY_REGION, KEY_TITLE, RunConfig,
};

/// Parse `sgaudit.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<SgauditConfigV1> {
    let cfg: SgauditConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the configuration used by a run (file + overrides + environment).
pub fn resolve_config(cfg: SgauditConfigV1, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
