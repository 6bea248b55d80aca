// dqguard-core/src/infrastructure/store/mod.rs

pub mod baseline;
pub mod reports;
pub mod rules;

pub use baseline::BaselineStore;
pub use reports::ReportStore;
pub use rules::RuleStore;
