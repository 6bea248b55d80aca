// dqguard-core/src/infrastructure/config/project.rs

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use super::settings::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["dqguard_project.yaml", "dqguard.yaml"];

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Chargement YAML
    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read project config at {:?}", config_path))?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Override via variables d'environnement (layering)
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Fail-secure : une config invalide arrête tout
    config.validate()?;
    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CANDIDATES
    )))
}

/// `DQGUARD_HISTORY_WINDOW`, `DQGUARD_AUTO_ACCEPT`, `DQGUARD_OUTPUT_PATH`.
/// Unparseable values are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("DQGUARD_HISTORY_WINDOW") {
        match val.trim().parse::<i64>() {
            Ok(window) => {
                info!(old = config.quality.history_window, new = window, "Overriding history window via ENV");
                config.quality.history_window = window;
            }
            Err(_) => warn!(value = %val, "Ignoring non-integer DQGUARD_HISTORY_WINDOW"),
        }
    }
    if let Some(val) = lookup("DQGUARD_AUTO_ACCEPT") {
        match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.suggestions.auto_accept = true,
            "0" | "false" | "no" | "off" => config.suggestions.auto_accept = false,
            _ => warn!(value = %val, "Ignoring unrecognized DQGUARD_AUTO_ACCEPT"),
        }
    }
    if let Some(val) = lookup("DQGUARD_OUTPUT_PATH") {
        info!(old = ?config.output_path, new = ?val, "Overriding output path via ENV");
        config.output_path = val;
    }
}
