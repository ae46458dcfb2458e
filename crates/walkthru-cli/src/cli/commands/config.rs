//! `walkthru config` subcommands.

use anyhow::{Context, Result};
use walkthru_core::Config;
use walkthru_core::config::paths;

/// Prints where the config file lives, noting when it has not been written.
pub fn path() {
    let config_path = paths::config_path();
    println!("{}", config_path.display());
    if !config_path.exists() {
        eprintln!("(not created yet; built-in defaults are in use)");
    }
}

/// Writes the commented default config unless one is already there.
pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

/// Prints the settings a session would start with.
pub fn show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
