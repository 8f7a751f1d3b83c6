/// MLC Soundboard - play the sound bank from a terminal
use clap::{Parser, Subcommand};
use soundboard::{commands, config::SoundboardConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "soundboard")]
#[command(about = "MLC soundboard for the terminal", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SOUNDBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive soundboard (default)
    Play,
    /// Fetch the manifest and store it locally
    Sync,
    /// List the locally stored sounds
    List,
    /// Serve the web shell through the offline cache
    ServeShell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "soundboard=debug,mlc_playback=debug,mlc_offline=debug,mlc_audio_desktop=debug,tower_http=debug"
    } else {
        "soundboard=info,mlc_playback=info,mlc_offline=info,tower_http=info"
    };

    // Logs go to stderr so they do not interleave with the board on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SoundboardConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => commands::play(&config).await?,
        Commands::Sync => commands::sync(&config).await?,
        Commands::List => commands::list(&config).await?,
        Commands::ServeShell => commands::serve_shell(&config).await?,
    }

    Ok(())
}
