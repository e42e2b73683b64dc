//! reelsite CLI - static video microsite generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "reelsite")]
#[command(about = "Static video microsite generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the microsite (default)
    Build(BuildArgs),

    /// Preview the built microsite
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "dist")]
        dir: PathBuf,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Scaffold input files in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Video list (JSON array)
    #[arg(long, default_value = commands::build::DEFAULT_DATA)]
    data: PathBuf,

    /// Site configuration (JSON object)
    #[arg(long, default_value = commands::build::DEFAULT_CONFIG)]
    config: PathBuf,

    /// Directory holding images/, assets/ and passthrough files
    #[arg(long, default_value = ".")]
    source: PathBuf,

    /// Output directory (cleared on every build)
    #[arg(short, long, default_value = "dist")]
    output: PathBuf,

    /// Directory of template overrides
    #[arg(long)]
    templates: Option<PathBuf>,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            data: PathBuf::from(commands::build::DEFAULT_DATA),
            config: PathBuf::from(commands::build::DEFAULT_CONFIG),
            source: PathBuf::from("."),
            output: PathBuf::from("dist"),
            templates: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins unless --verbose is given
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command.unwrap_or_else(|| Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => {
            commands::build::run(args).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(port, dir, !no_open).await?;
        }
        Commands::Init { yes } => {
            commands::init::run(yes).await?;
        }
    }

    Ok(())
}
