use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use triage_core::config::{RouterConfig, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the merged rule table and templates
    Check,
}

pub fn run(root: &Path, subcommand: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        ConfigSubcommand::Check => check(root, json),
    }
}

fn check(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = RouterConfig::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!(
            "Config OK: {} rules, {} templates",
            config.rules.len(),
            config.templates.len()
        );
    } else {
        for warning in &warnings {
            let level = match warning.level {
                WarnLevel::Error => "error",
                WarnLevel::Warning => "warning",
            };
            println!("{level}: {}", warning.message);
        }
    }

    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config check failed with {errors} error(s)");
    }
    Ok(())
}
