//! Use case orchestration for sgaudit.
//!
//! This crate provides the application layer: the evaluation run that coordinates the
//! resource supplier, the policy evaluator, the domain pipeline and the evidence sink, plus
//! the file- and process-backed adapters the CLI plugs into those seams.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod cancel;
mod error;
mod eval;
mod evaluator;
mod ports;
mod report;
mod sink;
mod supplier;

pub use cancel::CancelToken;
pub use error::{ErrorList, EvalError};
pub use eval::{EvalInput, EvalOutput, run_eval};
pub use evaluator::CommandEvaluator;
pub use ports::{EvidenceSink, ProviderSession, ResourceSupplier};
pub use report::{exit_code, parse_report_json, serialize_report};
pub use sink::{DirectorySink, MemorySink};
pub use supplier::{SnapshotSupplier, StaticSupplier};
