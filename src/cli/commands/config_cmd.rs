//! Configuration inspection commands.

use console::style;

use crate::cli::icons::error;
use crate::config::Config;

/// List configured sections in run order.
pub fn cmd_sections(config: &Config) -> anyhow::Result<()> {
    if config.sections.is_empty() {
        println!("{} No sections configured", error());
        return Ok(());
    }

    println!("\n{}", style("Sections").bold());
    println!("{}", "-".repeat(60));
    for (i, section) in config.sections.iter().enumerate() {
        println!("{:>2}. {:<20} {}", i + 1, section.name, style(&section.url).dim());
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn cmd_config(config: &Config) -> anyhow::Result<()> {
    if let Some(path) = &config.source_path {
        println!("# loaded from {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
