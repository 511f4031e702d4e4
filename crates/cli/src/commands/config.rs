//! `config` subcommands

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, DEFAULT_API_ENDPOINT};
use crate::output::{
    or_dash, print_field, print_header, print_info, print_json, print_success, OutputFormat,
};

/// Mask a secret, keeping only its last four characters
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

/// Print the stored configuration
pub fn show(config: &Config, path: &Path, format: OutputFormat) -> Result<()> {
    let shown = Config {
        api_token: config.api_token.as_deref().map(mask),
        ..config.clone()
    };

    match format {
        OutputFormat::Json => print_json(&shown)?,
        OutputFormat::Table => {
            print_header("Configuration");
            print_field("File", path.display());
            print_field(
                "API Endpoint",
                shown.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT),
            );
            print_field("Project", or_dash(shown.project.as_deref()));
            print_field("API Token", or_dash(shown.api_token.as_deref()));
            print_field("Format", shown.format.as_deref().unwrap_or("table"));
            if !path.exists() {
                println!();
                print_info("No config file yet, use `orch-cli config set` to create one");
            }
        }
    }
    Ok(())
}

/// Set one key and persist the file
pub fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_from(path)?;
    if key == "format" && !value.is_empty() && OutputFormat::from_config(value).is_none() {
        anyhow::bail!("invalid format '{}', expected table or json", value);
    }
    config.set(key, value)?;
    config.save_to(path)?;
    print_success(&format!("Set {} in {}", key, path.display()));
    Ok(())
}
