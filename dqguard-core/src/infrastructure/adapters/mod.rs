pub mod duckdb;
pub mod heuristic;

pub use self::duckdb::DuckDbReader;
pub use heuristic::HeuristicSuggester;
