//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting sng-inspect defaults.

use crate::config::Config;
use crate::session::parse_load_bias;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Settings given on the `configure` command line
#[derive(Debug, Default)]
pub struct Settings {
    pub symbols: Option<PathBuf>,
    pub load_bias: Option<String>,
    pub max_queue_length: Option<usize>,
}

impl Settings {
    fn is_empty(&self) -> bool {
        self.symbols.is_none() && self.load_bias.is_none() && self.max_queue_length.is_none()
    }
}

/// Handle the configure command
pub fn handle(settings: Settings, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if settings.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, settings)?;
    config.save()?;

    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Update `config` with the given settings
fn apply(config: &mut Config, settings: Settings) -> Result<()> {
    if let Some(bias) = &settings.load_bias {
        parse_load_bias(bias)?;
    }
    if settings.max_queue_length == Some(0) {
        bail!("--max-queue-length must be at least 1");
    }

    if let Some(path) = settings.symbols {
        println!("Symbol table configured: {}", path.display());
        config.symbols = Some(path);
    }

    if let Some(bias) = settings.load_bias {
        println!("Load bias configured: {}", bias);
        config.load_bias = Some(bias);
    }

    if let Some(max) = settings.max_queue_length {
        println!("Max queue length configured: {}", max);
        config.max_queue_length = Some(max);
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.symbols {
        Some(path) => println!("Symbol table: {}", path.display()),
        None => println!("No symbol table configured"),
    }

    println!(
        "Load bias: {}",
        config.load_bias.as_deref().unwrap_or("0 (not set)")
    );

    if let Some(max) = config.max_queue_length {
        println!("Max queue length: {}", max);
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!(
        "Usage: sng-inspect configure --symbols syslog-ng.nm [--load-bias auto] \
         [--max-queue-length N]"
    );
    println!("   or: sng-inspect configure --show");
    println!();
    println!("Create the symbol listing with: nm --defined-only $(which syslog-ng)");
}
