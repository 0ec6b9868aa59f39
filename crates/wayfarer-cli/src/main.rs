use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wayfarer-cli", version, about = "Wayfarer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account registration and login
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Trip management
    Trip {
        #[command(subcommand)]
        action: commands::trip::TripAction,
    },
    /// Itinerary activities
    Itinerary {
        #[command(subcommand)]
        action: commands::itinerary::ItineraryAction,
    },
    /// PIN-gated document vault
    Vault {
        #[command(subcommand)]
        action: commands::vault::VaultAction,
    },
    /// Reminder inspection and dispatch
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Regenerate pending reminder triggers from stored activities
    Boot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Trip { action } => commands::trip::run(action),
        Commands::Itinerary { action } => commands::itinerary::run(action),
        Commands::Vault { action } => commands::vault::run(action),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Boot => commands::remind::boot(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
