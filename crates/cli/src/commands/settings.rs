//! `costctl config` subcommands

use anyhow::Result;

use crate::config::Config;
use crate::output::{print_info, print_json};

pub fn show(config: &Config) -> Result<()> {
    print_info(&format!("Config file: {}", Config::config_path()?.display()));
    print_json(config)
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    let path = config.save()?;
    print_info(&format!("Saved {} to {}", key, path.display()));
    Ok(())
}
