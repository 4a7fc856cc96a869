use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_publisher::cli::{self, Cli};
use blog_publisher::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing or invalid arguments exit here with usage text (status 2)
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("blog_publisher={}", config.log_level).into());

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!(output_dir = %config.output_dir.display(), "Configuration loaded");

    if let Err(e) = cli::execute(cli.command, &config).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }

    Ok(())
}
