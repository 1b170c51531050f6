mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "smokestack",
    about = "Smoke-test container images and reap test containers"
)]
#[command(version)]
struct Cli {
    /// Container engine executable (overrides [engine].program)
    #[arg(long, global = true, value_name = "PROGRAM")]
    engine: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a container from IMAGE, probe it over HTTP, then stop and remove it
    Smoke {
        /// Image reference, e.g. site:abc1234
        image: String,
    },
    /// Stop and remove containers; a missing container is not an error
    Reap {
        /// Container names or ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Kill instead of stopping gracefully
        #[arg(long)]
        kill: bool,
    },
    /// Check container engine and configuration
    Doctor,
    /// Write a commented smokestack.toml into the current directory
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = cli.engine.as_deref();

    let result = match cli.command {
        Commands::Smoke { image } => commands::smoke(&image, engine).await,
        Commands::Reap { ids, kill } => commands::reap(&ids, kill, engine).await,
        Commands::Doctor => commands::doctor(engine).await,
        Commands::Init => commands::init(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            commands::exit_code(&e)
        }
    }
}
