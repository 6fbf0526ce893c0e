//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::defaults::TOKEN_ENV_VAR;
use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "api.base_url")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key.as_deref(), args.value.as_deref()) {
        (None, _) => show_all_config(&config),
        (Some(key), None) => {
            let value = config.get(key).ok_or_else(|| unknown_key(key))?;
            println!("{}", value);
        }
        (Some(key), Some(value)) => {
            if config.get(key).is_none() {
                return Err(unknown_key(key));
            }
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {}. Available keys: {}",
        key,
        Config::available_keys().join(", ")
    ))
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[api]");
    println!("base_url = \"{}\"", config.api.base_url);
    if config.api.token.is_empty() {
        println!("token = \"\" # not configured");
    } else {
        println!("token = \"***\" # configured");
    }
    println!("timeout_secs = {}", config.api.timeout_secs);
    println!();

    println!("[geocode]");
    println!("forward_limit = {}", config.geocode.forward_limit);
    println!();

    println!("[map]");
    println!("hover_delay_ms = {}", config.map.hover_delay_ms);
    println!("default_format = \"{}\"", config.map.default_format);

    if std::env::var(TOKEN_ENV_VAR).is_ok_and(|t| !t.is_empty()) {
        println!();
        println!("# token overridden by {}", TOKEN_ENV_VAR);
    }
}
