// dqguard/src/commands/mod.rs

pub mod baseline;
pub mod rules;
pub mod run;

use anyhow::Context;
use std::path::Path;
use dqguard_core::infrastructure::config::{ProjectConfig, apply_env_overrides, load_project_config};
use dqguard_core::infrastructure::error::InfrastructureError;

/// Project config, or the built-in defaults when `--defaults` is set and no
/// config file exists.
pub fn load_config(project_dir: &Path, defaults: bool) -> anyhow::Result<ProjectConfig> {
    match load_project_config(project_dir) {
        Ok(config) => Ok(config),
        Err(InfrastructureError::ConfigNotFound(_)) if defaults => {
            println!("   ⚠️  No dqguard.yaml found, using built-in defaults");
            let mut config = ProjectConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            Ok(config)
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "Failed to load project configuration from {:?}",
                project_dir
            )
        }),
    }
}
