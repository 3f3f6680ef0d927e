use std::path::Path;

use anyhow::Result;
use scrollfx_core::AppConfig;

fn resolve(path: Option<&Path>) -> std::path::PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

pub fn path(path: Option<&Path>) -> Result<()> {
    let path = resolve(path);
    let state = if path.exists() { "" } else { " (not created)" };
    println!("{}{}", path.display(), state);
    Ok(())
}

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve(path);
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("\nUse --force to overwrite it with the defaults.");
        return Ok(());
    }
    AppConfig::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
