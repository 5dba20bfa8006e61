//! Preference commands (`config show|get|set|reset`)

use anyhow::Result;

use crate::commands::CommandContext;
use crate::config::Config;
use crate::output::{colors, TableFormatter};

const KEYS: [&str; 5] = ["output_format", "colored", "precision", "cache_dir", "log_format"];

/// Show every preference
pub fn show(ctx: &CommandContext) -> Result<()> {
    let rows = KEYS
        .iter()
        .map(|key| {
            vec![
                key.to_string(),
                ctx.config.get(key).unwrap_or_else(|| "(not set)".to_string()),
            ]
        })
        .collect();
    println!("{}", TableFormatter::simple(vec!["Key", "Value"], rows));
    println!(
        "{}",
        colors::dim(&format!("File: {}", Config::config_file()?.display()))
    );
    Ok(())
}

/// Print one preference
pub fn get(ctx: &CommandContext, key: &str) -> Result<()> {
    match ctx.config.get(key) {
        Some(value) => println!("{}", value),
        None if KEYS.contains(&key) => println!("{}", colors::dim("(not set)")),
        None => anyhow::bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

/// Change one saved preference
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::stored()?;
    config.set(key, value)?;
    config.save()?;
    println!("{}", colors::success(&format!("Set {} = {}", key, value)));
    Ok(())
}

/// Reset saved preferences to defaults
pub fn reset() -> Result<()> {
    Config::default().save()?;
    println!("{}", colors::success("Configuration reset to defaults"));
    Ok(())
}
