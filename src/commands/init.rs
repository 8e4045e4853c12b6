use anyhow::{bail, Result};
use std::path::Path;

use crate::config::{ExtractorConfig, DEFAULT_CONFIG_FILE};
use crate::logging;

pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(DEFAULT_CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = ExtractorConfig::default();
    let config_str = serde_json::to_string_pretty(&config)?;
    std::fs::write(config_path, format!("{}\n", config_str))?;

    logging::info(&format!("Created configuration file: {}\n", config_path.display()));
    logging::info(&format!("  Translators: {:?}", config.translator_objects));
    logging::info(&format!("  Methods: {:?}", config.translator_methods));
    logging::info(&format!("  Default domain: {}", config.default_domain));
    logging::info(&format!("  Extensions: {:?}", config.extensions));

    logging::info("\nNext steps:");
    logging::info("  Run 'js-trans-extractor extract <dir>' to extract translation messages");

    Ok(())
}
