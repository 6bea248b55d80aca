// dqguard/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dqguard")]
#[command(about = "Rule-driven data quality pipeline with drift & outlier tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs one batch (Rules -> Report -> Baseline -> Suggestions)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// CSV batch to process (default: last CSV found under <project>/data)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Use built-in defaults when no dqguard.yaml is present
        #[arg(long)]
        defaults: bool,

        /// Append confident suggestions to the rule file
        #[arg(long)]
        auto_accept: bool,

        /// Skip the suggestion step
        #[arg(long)]
        no_suggestions: bool,
    },

    /// 📜 Lists the rule set and how each rule parses
    Rules {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long)]
        defaults: bool,
    },

    /// 📈 Shows the stored baseline snapshots (oldest first)
    Baseline {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long)]
        defaults: bool,
    },
}
