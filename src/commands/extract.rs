use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::catalogue::MessageCatalogue;
use crate::config::ExtractorConfig;
use crate::extractor::JsExtractor;
use crate::logging;

pub struct ExtractArgs {
    pub paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub locale: String,
    pub parallel: bool,
}

pub fn run(config: ExtractorConfig, args: ExtractArgs) -> Result<()> {
    logging::info("=== js-trans-extractor extract ===\n");
    logging::info(&format!("  Paths: {:?}", args.paths));
    logging::info(&format!("  Translators: {:?}", config.translator_objects));
    logging::info(&format!("  Methods: {:?}", config.translator_methods));
    logging::info(&format!("  Default domain: {}", config.default_domain));

    let extractor = JsExtractor::new(config).context("Invalid extractor configuration")?;
    let mut catalogue = MessageCatalogue::new(args.locale);

    let summary = if args.parallel {
        extractor.extract_parallel(&args.paths, &mut catalogue)?
    } else {
        extractor.extract(&args.paths, &mut catalogue)?
    };

    let json = serde_json::to_string_pretty(&catalogue)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write catalogue: {}", path.display()))?;
            logging::info(&format!("\nWrote catalogue: {}", path.display()));
        }
        None => println!("{}", json),
    }

    logging::info("\nExtraction Summary:");
    logging::info(&format!("  Files processed: {}", summary.files_processed));
    logging::info(&format!("  Messages recorded: {}", summary.messages_recorded));
    logging::info(&format!("  Unique messages: {}", catalogue.len()));
    if !summary.fallback_files.is_empty() {
        logging::info(&format!(
            "  Extracted with regex fallback: {}",
            summary.fallback_files.len()
        ));
    }

    if !summary.skipped_files.is_empty() {
        logging::warn(&format!(
            "  Skipped unreadable files: {}",
            summary.skipped_files.len()
        ));
    }

    Ok(())
}
