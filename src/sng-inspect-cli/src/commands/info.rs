//! `info` and `config` handlers

use anyhow::{Context, Result};
use sng_inspect::{config_text, ConfigText, InstanceInfo, Target};

/// Handle the info command
pub fn handle_info(target: &Target<'_>) -> Result<()> {
    let info = InstanceInfo::read(target).context("Failed to read instance info")?;
    print!("{}", render_info(&info));
    Ok(())
}

pub fn render_info(info: &InstanceInfo) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("main_loop = {}\n", info.main_loop));
    out.push_str(&format!("current_configuration = {}\n", info.config));
    out.push_str("resolvedConfigurablePaths = {\n");
    for (name, value) in info.paths.entries() {
        match value {
            Some(value) => out.push_str(&format!("  {} = {:?}\n", name, value)),
            None => out.push_str(&format!("  {} = NULL\n", name)),
        }
    }
    out.push_str("}\n\n");
    out
}

/// Handle the config command
pub fn handle_config(target: &Target<'_>, preprocessed: bool) -> Result<()> {
    let which = if preprocessed {
        ConfigText::Preprocessed
    } else {
        ConfigText::Original
    };

    match config_text(target, which).context("Failed to read configuration text")? {
        Some(text) => print!("{}", text),
        None => eprintln!("No {:?} configuration text stored", which),
    }

    Ok(())
}
