// dqguard-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;
pub mod store;

pub use adapters::{DuckDbReader, HeuristicSuggester};
pub use store::{BaselineStore, ReportStore, RuleStore};
