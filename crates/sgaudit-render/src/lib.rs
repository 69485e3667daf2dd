//! Rendering of run reports for CI surfaces.

#![forbid(unsafe_code)]

mod markdown;

pub use markdown::render_markdown;
