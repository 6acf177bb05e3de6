//! ICST CLI - command-line front end for the ICST DSP core.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "icst")]
#[command(author, version, about = "ICST DSP core CLI", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the fundamental of a synthetic harmonic tone
    Pitch(commands::pitch::PitchArgs),

    /// Linear prediction and line spectral frequencies of a formant signal
    Lpc(commands::lpc::LpcArgs),

    /// Render an oscillator through envelope and filter
    Render(commands::render::RenderArgs),

    /// Show or check analysis configuration files
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pitch(args) => commands::pitch::run(args),
        Commands::Lpc(args) => commands::lpc::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
