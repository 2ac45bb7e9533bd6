//! Codescope CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(about = "Cached, rate-limited LLM analysis and call graphs for source trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree and write the result bundle
    Analyze {
        /// Root of the source tree
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output bundle path
        #[arg(short, long, default_value = "analysis_results.json")]
        output: PathBuf,

        /// Settings file (defaults to ./codescope.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cache file (defaults to <root>/.codescope/analysis_cache.json)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Maximum simultaneous inference calls
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// Calls admitted per rate window
        #[arg(long)]
        calls_per_window: Option<usize>,

        /// Rate window length in seconds
        #[arg(long)]
        window_secs: Option<u64>,

        /// Model name sent to the endpoint
        #[arg(long)]
        model: Option<String>,
    },
    /// Delete the analysis cache of a source tree
    Clear {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env is optional
    dotenvy::dotenv().ok();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codescope={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze {
            root,
            output,
            config,
            cache,
            max_concurrency,
            calls_per_window,
            window_secs,
            model,
        } => {
            let overrides = commands::Overrides {
                cache,
                max_concurrency,
                calls_per_window,
                window_secs,
                model,
            };
            commands::analyze(root, output, config, overrides).await
        }
        Commands::Clear { root } => commands::clear(root),
        Commands::Version => {
            println!("Codescope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
