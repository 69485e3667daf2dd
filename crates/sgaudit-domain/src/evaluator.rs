use crate::model::ResourceDocument;
use anyhow::Context;
use sgaudit_types::{PolicyPath, Verdict};

/// The opaque policy engine.
///
/// Implementations receive the document by shared reference and must not depend on any
/// state carried over from a previous call.
pub trait PolicyEvaluator: Send + Sync {
    fn evaluate(
        &self,
        document: &ResourceDocument,
        policy: &PolicyPath,
    ) -> anyhow::Result<Vec<Verdict>>;
}

impl<E: PolicyEvaluator + ?Sized> PolicyEvaluator for &E {
    fn evaluate(
        &self,
        document: &ResourceDocument,
        policy: &PolicyPath,
    ) -> anyhow::Result<Vec<Verdict>> {
        (**self).evaluate(document, policy)
    }
}

/// Evaluate one policy against one resource document.
pub fn evaluate_policy<E: PolicyEvaluator + ?Sized>(
    evaluator: &E,
    document: &ResourceDocument,
    policy: &PolicyPath,
) -> anyhow::Result<Vec<Verdict>> {
    evaluator
        .evaluate(document, policy)
        .with_context(|| format!("evaluate policy {policy}"))
}
