//! Config command implementation - print or write the effective configuration

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let to_save = if example { Config::default() } else { config.clone() };
            to_save.save_to_file(&path)?;
            log::info!("Configuration written to: {}", path.display());
        }
        None => {
            let text = if example {
                Config::example_toml()?
            } else {
                toml::to_string_pretty(config)?
            };
            print!("{}", text);
        }
    }
    Ok(())
}
