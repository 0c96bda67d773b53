//! `modelmux status` — show backend availability and routing state.

use anyhow::Result;
use colored::Colorize;

use modelmux_core::config::{get_config_path, load_config};
use modelmux_router::{ModelRouter, ResolvedFamily};

/// Run the status command.
pub async fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Modelmux Status".cyan().bold());
    println!();

    // Config
    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );
    println!("  {:<18} {}", "Region:".bold(), config.router.region);
    println!(
        "  {:<18} {}",
        "Preferred family:".bold(),
        config.router.preferred_family
    );
    if config.endpoint.is_configured() {
        println!("  {:<18} {}", "Endpoint:".bold(), config.endpoint.name);
    } else {
        println!("  {:<18} {}", "Endpoint:".bold(), "not configured".dimmed());
    }

    // Probe both families
    let router = ModelRouter::connect(&config).await;
    let availability = router.availability();

    println!();
    println!("  {}", "Backends:".bold());
    println!(
        "    {:<16} {}",
        "Bedrock",
        if availability.bedrock {
            "✓ reachable".green().to_string()
        } else {
            "✗ unreachable".red().to_string()
        }
    );
    println!(
        "    {:<16} {}",
        "Jumpstart",
        if availability.jumpstart {
            "✓ deployed".green().to_string()
        } else {
            "✗ not deployed".red().to_string()
        }
    );

    println!();
    match router.resolved_family() {
        ResolvedFamily::Unavailable => {
            println!(
                "  {} {}",
                "Default model:".bold(),
                "none (no backend available)".red()
            );
        }
        family => {
            let default = router
                .default_model_name()
                .map(str::to_string)
                .unwrap_or_else(|e| e.to_string());
            println!("  {:<18} {} ({:?})", "Default model:".bold(), default, family);
        }
    }

    // Menu
    let names = router.model_names();
    if !names.is_empty() {
        println!();
        println!("  {}", "Models:".bold());
        for name in names {
            println!(
                "    {:<40} (limit: {} chars)",
                name,
                router.char_limit(name)
            );
        }
    }

    println!();
    Ok(())
}
