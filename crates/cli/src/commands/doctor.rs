//! `billwise doctor`: diagnose configuration and data problems.

use std::path::Path;

use billwise_config::AppConfig;
use billwise_tools::BillStore;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    println!("billwise doctor");
    println!("===============\n");

    let mut issues = 0;

    if config_path.exists() {
        println!("  ok   Config file found: {}", config_path.display());
    } else {
        println!(
            "  warn No config file at {} (run `billwise onboard`)",
            config_path.display()
        );
    }

    let config = match AppConfig::load_with_env(config_path) {
        Ok(config) => {
            println!("  ok   Config valid");
            config
        }
        Err(e) => {
            println!("  FAIL Config invalid: {e}");
            anyhow::bail!("1 issue found");
        }
    };

    println!(
        "  ok   Backend: {} / {}",
        config.default_provider, config.default_model
    );

    if !billwise_providers::missing_api_key(&config) {
        println!("  ok   API key available");
    } else {
        println!("  FAIL No API key: set BILLWISE_API_KEY or api_key in the config");
        issues += 1;
    }

    match &config.data.bills_path {
        Some(path) => match BillStore::load(path) {
            Ok(store) if store.is_empty() => {
                println!("  warn Bill data at {} is empty", path.display());
            }
            Ok(store) => println!("  ok   {} bills loaded from {}", store.len(), path.display()),
            Err(e) => {
                println!("  FAIL {e}");
                issues += 1;
            }
        },
        None => {
            println!(
                "  FAIL No bill data configured: set [data] bills_path or BILLWISE_BILLS_PATH"
            );
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
        Ok(())
    } else {
        anyhow::bail!("{issues} issue(s) found")
    }
}
