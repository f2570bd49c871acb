use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fitpact", version, about = "FitPact CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management and login
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Log and browse activities
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Weekly progress for the whole group
    Dashboard {
        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
        /// Keep re-reading at the configured poll interval
        #[arg(long)]
        watch: bool,
    },
    /// Your week-by-week history
    History {
        /// Print history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Group chat
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Coach-only actions: settings, penalty overrides, AI tips
    Coach {
        #[command(subcommand)]
        action: commands::coach::CoachAction,
    },
    /// Forfeit the current week (charges the penalty immediately)
    Giveup {
        /// Confirm the forfeit
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Dashboard { json, watch } => commands::dashboard::run(json, watch),
        Commands::History { json } => commands::history::run(json),
        Commands::Chat { action } => commands::chat::run(action),
        Commands::Coach { action } => commands::coach::run(action),
        Commands::Giveup { yes } => commands::giveup::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
