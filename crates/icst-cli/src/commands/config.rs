//! Analysis configuration commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use icst_analysis::AnalysisConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the default configuration as TOML
    Show,

    /// Parse and validate a configuration file
    Validate {
        /// Configuration file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Write the default configuration to a file
    Init {
        /// Destination file
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            print!("{}", AnalysisConfig::default().to_toml_string()?);
        }
        ConfigCommand::Validate { path } => {
            let config = AnalysisConfig::load(&path)
                .with_context(|| format!("{} is not a valid configuration", path.display()))?;
            println!("{}: ok", path.display());
            println!("  sample rate:   {} Hz", config.sample_rate);
            println!("  spectrum size: {}", config.spectrum.size);
            println!(
                "  pitch:         {} samples, {:?}",
                config.pitch.size, config.pitch.scheme
            );
            println!(
                "  mfcc:          {} bands, {} coefficients, {}..{} Hz",
                config.mfcc.bands, config.mfcc.coefficients, config.mfcc.low, config.mfcc.high
            );
            println!(
                "  lpc:           order {}, grid {}",
                config.lpc.order, config.lpc.grid
            );
            println!("  tracking size: {}", config.tracking.size);
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} exists; pass --force to overwrite", path.display());
            }
            AnalysisConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
