// dqguard-core/src/application/mod.rs

pub mod pipeline;
pub mod report;
pub mod suggestions;
pub mod transform;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use dqguard_core::application::{run_pipeline, build_report};`

pub use pipeline::{RunResult, run_pipeline};
pub use report::{build_and_record, build_report};
pub use suggestions::auto_accept;
pub use transform::{prepare_batch, transform};
