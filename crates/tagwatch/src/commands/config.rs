//! Config command

use anyhow::Result;

use crate::cli::{ConfigCommands, GlobalOpts};
use crate::commands::load_config;

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(global),
        ConfigCommands::Path => path(global),
    }
}

fn show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    print!("{}", serde_yaml_ng::to_string(&config)?);
    Ok(())
}

fn path(global: &GlobalOpts) -> Result<()> {
    let loader = tagwatch_core::ConfigLoader::for_path(global.config.as_deref())?;
    let path = loader.config_path();
    if path.exists() {
        println!("{}", path);
    } else {
        println!("{} (not present, using defaults)", path);
    }
    Ok(())
}
