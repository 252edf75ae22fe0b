//! `billwise onboard`: write a starter config file.

use std::path::Path;

use anyhow::Context;
use billwise_config::AppConfig;

pub fn run(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("Config already exists: {}", config_path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    std::fs::write(config_path, AppConfig::default_toml())
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    println!("Wrote default config: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set api_key (or export BILLWISE_API_KEY / OPENAI_API_KEY)");
    println!("  2. Point [data] bills_path at your scraped bills JSON");
    println!("  3. Run `billwise doctor`, then `billwise \"What bills are about healthcare?\"`");
    Ok(())
}
