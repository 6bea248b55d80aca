// dqguard-core/src/ports/mod.rs

pub mod reader;
pub mod suggester;

pub use reader::DatasetReader;
pub use suggester::RuleSuggester;
