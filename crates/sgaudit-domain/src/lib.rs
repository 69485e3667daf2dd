//! Pure policy evaluation pipeline (no IO).
//!
//! Input: a provider-native security group and verdicts from a policy evaluator.
//! Output: evidence artifacts grouped into assessment results with stable stream ids.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod assemble;
pub mod context;
pub mod evaluator;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod stream;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use aggregate::ResultAggregator;
pub use assemble::{AssemblyInput, EvidenceSet, assemble, expiry_for};
pub use context::EvidenceContext;
pub use evaluator::{PolicyEvaluator, evaluate_policy};
pub use labels::{merge_configured_labels, merge_labels};
pub use model::{NormalizedResource, ResourceDocument, SecurityGroup};
pub use normalize::{NormalizeError, normalize};
pub use stream::stream_id;
