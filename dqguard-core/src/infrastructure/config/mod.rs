pub mod project;
pub mod settings;

pub use project::{apply_env_overrides, load_project_config};
pub use settings::{DerivedColumn, ProjectConfig, QualityConfig, SuggestionConfig};
