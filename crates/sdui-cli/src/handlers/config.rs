use crate::types::OutputFormat;
use anyhow::Result;
use sdui_runtime::Config;
use std::path::Path;

pub fn handle(path: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# {} (not found, using defaults)", path.display());
            }
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}
