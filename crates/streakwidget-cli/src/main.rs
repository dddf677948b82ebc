use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "streakwidget-cli", version, about = "Streakwidget CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a streak without touching the store or surfaces
    Evaluate(commands::evaluate::EvaluateArgs),
    /// Refresh every attached surface now
    Refresh,
    /// Show the stored streak and what surfaces would display
    Status,
    /// Surface management
    Surface {
        #[command(subcommand)]
        action: commands::surface::SurfaceAction,
    },
    /// Run the daily refresh in the foreground until interrupted
    Daemon,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("STREAKWIDGET_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args),
        Commands::Refresh => commands::refresh::run(),
        Commands::Status => commands::refresh::status(),
        Commands::Surface { action } => commands::surface::run(action),
        Commands::Daemon => commands::daemon::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
