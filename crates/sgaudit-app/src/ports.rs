//! Seams to the external collaborators of a run.

use sgaudit_domain::SecurityGroup;
use sgaudit_types::Submission;

/// Provider session parameters established from the run configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderSession {
    /// `None` when the configured region was missing or invalid.
    pub region: Option<String>,
}

/// Enumerates the security groups in scope.
///
/// A failure is yielded as an `Err` item; items yielded before it are still evaluated.
pub trait ResourceSupplier: Send + Sync {
    fn security_groups<'a>(
        &'a self,
        session: &ProviderSession,
    ) -> Box<dyn Iterator<Item = anyhow::Result<SecurityGroup>> + 'a>;
}

/// Receives one assessment result per (resource, policy) pair.
pub trait EvidenceSink: Send + Sync {
    fn publish(&self, submission: &Submission) -> anyhow::Result<()>;
}
