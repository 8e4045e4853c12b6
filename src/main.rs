use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use js_trans_extractor::commands::{self, extract::ExtractArgs};
use js_trans_extractor::config::ExtractorConfig;
use js_trans_extractor::logging::{self, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "js-trans-extractor")]
#[command(
    author,
    version,
    about = "Extract Translator.trans() messages from JavaScript sources",
    long_about = None
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract translation messages from files and directories
    Extract {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the catalogue here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Locale of the produced catalogue
        #[arg(long, default_value = "en")]
        locale: String,

        /// Prefix for default translations (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Domain for calls without one (overrides config)
        #[arg(long)]
        default_domain: Option<String>,

        /// Parse files in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level)
        .ok_or_else(|| anyhow!("Unknown log level: {}", cli.log_level))?;
    logging::set_level(level);

    match cli.command {
        Commands::Extract {
            paths,
            output,
            locale,
            prefix,
            default_domain,
            parallel,
        } => {
            let mut config = ExtractorConfig::load_or_default(cli.config.as_ref())?;
            if let Some(prefix) = prefix {
                config.prefix = prefix;
            }
            if let Some(domain) = default_domain {
                config.default_domain = domain;
            }

            commands::extract::run(
                config,
                ExtractArgs {
                    paths,
                    output,
                    locale,
                    parallel,
                },
            )?;
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
        }
    }

    Ok(())
}
