use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(about = "Kindred - chat with your characters", long_about = None)]
struct Cli {
    /// Keep config and data under this directory instead of the platform dirs
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage characters
    Characters {
        #[command(subcommand)]
        action: commands::characters::CharacterAction,
    },
    /// Manage personas
    Personas {
        #[command(subcommand)]
        action: commands::personas::PersonaAction,
    },
    /// Show recent chats
    Recent {
        /// Maximum number of entries (defaults to `recent_limit`)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the most recently used characters
    Active {
        #[arg(long, default_value_t = kindred_application::recent::DEFAULT_ACTIVE_CHARACTERS)]
        count: usize,
    },
    /// Manage chat history
    History {
        #[command(subcommand)]
        action: commands::recent::HistoryAction,
    },
    /// Chat with a character as one of your personas
    Chat {
        character: String,
        persona: String,
    },
    /// Manage backend services
    Services {
        #[command(subcommand)]
        action: commands::services::ServiceAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = app::bootstrap::resolve_paths(cli.base_dir.as_deref())?;
    let _log_guard = logging::init_logging(&paths.logs_dir())?;
    let state = app::bootstrap(paths)?;

    let result = match cli.command {
        Commands::Characters { action } => commands::characters::run(&state, action).await,
        Commands::Personas { action } => commands::personas::run(&state, action).await,
        Commands::Recent { limit } => commands::recent::list(&state, limit).await,
        Commands::Active { count } => commands::recent::active(&state, count).await,
        Commands::History { action } => commands::recent::history(&state, action).await,
        Commands::Chat { character, persona } => {
            commands::chat::run(&state, &character, &persona).await
        }
        Commands::Services { action } => commands::services::run(&state, action).await,
    };

    state.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_chat_command() {
        let cli = Cli::try_parse_from(["kindred", "chat", "luna_1", "me_2"]).unwrap();
        match cli.command {
            Commands::Chat { character, persona } => {
                assert_eq!(character, "luna_1");
                assert_eq!(persona, "me_2");
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_parses_global_base_dir_and_defaults() {
        let cli = Cli::try_parse_from(["kindred", "active", "--base-dir", "/tmp/k"]).unwrap();
        assert_eq!(cli.base_dir, Some(PathBuf::from("/tmp/k")));
        assert!(matches!(cli.command, Commands::Active { count: 3 }));
    }

    #[test]
    fn test_history_delete_requires_both_ids() {
        assert!(Cli::try_parse_from(["kindred", "history", "delete", "luna_1"]).is_err());
        assert!(Cli::try_parse_from(["kindred", "history", "delete", "luna_1", "me"]).is_ok());
    }
}
