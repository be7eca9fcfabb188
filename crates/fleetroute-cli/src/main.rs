use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod workspace;

#[derive(Parser)]
#[command(name = "fleetroute-cli", version, about = "Fleet route composition CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Job collection
    Jobs {
        #[command(subcommand)]
        action: commands::jobs::JobsAction,
    },
    /// Lasso drawing
    Draw {
        #[command(subcommand)]
        action: commands::draw::DrawAction,
    },
    /// Cluster confirmation and completion
    Cluster {
        #[command(subcommand)]
        action: commands::cluster::ClusterAction,
    },
    /// Manual route composition
    Route {
        #[command(subcommand)]
        action: commands::route::RouteAction,
    },
    /// Failed write-backs and manual retry
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Jobs { action } => commands::jobs::run(action),
        Commands::Draw { action } => commands::draw::run(action),
        Commands::Cluster { action } => commands::cluster::run(action),
        Commands::Route { action } => commands::route::run(action),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
