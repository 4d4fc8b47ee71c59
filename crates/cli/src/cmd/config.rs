//! Implementation of the `texbuild config` command.

use std::path::Path;

use anyhow::{Context, Result};
use texbuild_lib::BuildConfig;

use crate::output::print_json;

/// Load the configuration file (or defaults) and apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<BuildConfig> {
  let mut config = match path {
    Some(path) => BuildConfig::from_json_file(path).context("Failed to load configuration")?,
    None => BuildConfig::default(),
  };
  config.apply_env_overrides();
  Ok(config)
}

pub fn cmd_config(path: Option<&Path>) -> Result<()> {
  let config = load_config(path)?;
  print_json(&config)
}
