//! configure command - manage configuration

use super::CommandContext;
use crate::config::Config;
use crate::ConfigureAction;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

pub async fn execute(ctx: &CommandContext, action: Option<ConfigureAction>) -> Result<()> {
    match action {
        Some(ConfigureAction::Set { key, value }) => set_config(ctx, &key, &value),
        Some(ConfigureAction::Get { key }) => get_config(ctx, &key),
        Some(ConfigureAction::List) => list_config(ctx),
        None => interactive_configure(ctx),
    }
}

fn set_config(ctx: &CommandContext, key: &str, value: &str) -> Result<()> {
    // Edit the file as stored, without environment overrides
    let mut config = Config::load_file(&ctx.config_path)?;
    config.set_value(key, value)?;
    config.save(&ctx.config_path)?;

    let shown = config.get_value(key).unwrap_or_default();
    println!("Set {} = {}", key.cyan(), shown);
    Ok(())
}

fn get_config(ctx: &CommandContext, key: &str) -> Result<()> {
    if !Config::keys().contains(&key) {
        anyhow::bail!("Unknown config key: {}", key);
    }
    match ctx.config.get_value(key) {
        Some(value) => println!("{}", value),
        None => println!("(not set)"),
    }
    Ok(())
}

fn list_config(ctx: &CommandContext) -> Result<()> {
    println!("{}", "Current configuration:".bold());
    println!();

    for key in Config::keys() {
        let value = ctx
            .config
            .get_value(key)
            .unwrap_or_else(|| "(not set)".to_string());
        println!("  {}: {}", key.cyan(), value);
    }

    println!();
    println!(
        "Config file: {}",
        ctx.config_path.display().to_string().dimmed()
    );

    Ok(())
}

fn prompt(label: &str, current: &str) -> Result<Option<String>> {
    print!("{} [{}]: ", label, current);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

fn interactive_configure(ctx: &CommandContext) -> Result<()> {
    println!("{}", "pdrive Configuration".bold());
    println!("Press Enter to keep current value.\n");

    let mut config = Config::load_file(&ctx.config_path)?;

    let current_url = config.api_url.clone().unwrap_or_default();
    if let Some(url) = prompt("API URL", &current_url)? {
        config.api_url = Some(url);
    }

    let masked = if config.token.is_some() { "***" } else { "" };
    if let Some(token) = prompt("Token", masked)? {
        config.token = Some(token);
    }

    let current_workers = config.concurrent_requests.to_string();
    if let Some(workers) = prompt("Concurrent requests", &current_workers)? {
        config.set_value("concurrent_requests", &workers)?;
    }

    config.save(&ctx.config_path)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        "✓".green(),
        ctx.config_path.display()
    );

    Ok(())
}
