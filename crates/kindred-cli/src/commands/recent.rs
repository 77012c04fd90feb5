use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use kindred_application::{RecentActivityView, active_characters};
use kindred_core::recent::RecentEntry;

use crate::app::AppState;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Delete the chat history of one character/persona pair
    Delete { character: String, persona: String },
}

fn print_entries(entries: &[RecentEntry]) {
    if entries.is_empty() {
        println!("{}", "No recent chats.".bright_black());
    }
    for entry in entries {
        println!(
            "{}  {} {}",
            entry.name.bold(),
            format!("{} / {}", entry.character_id, entry.persona_id).bright_cyan(),
            entry
                .last_message
                .as_ref()
                .map(|m| format!("- {}", m))
                .unwrap_or_default()
                .bright_black()
        );
    }
}

pub async fn list(state: &AppState, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(state.config.recent_limit);
    print_entries(&state.recent.load_recent(limit).await);
    Ok(())
}

pub async fn active(state: &AppState, count: usize) -> Result<()> {
    let characters = state.records.list_characters().await?;
    let active = active_characters(&characters, count);
    if active.is_empty() {
        println!("{}", "No characters used yet.".bright_black());
    }
    for character in active {
        println!("{}  {}", character.id.bright_cyan(), character.name.bold());
    }
    Ok(())
}

pub async fn history(state: &AppState, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::Delete { character, persona } => {
            let mut view = RecentActivityView::new();
            let ticket = view.begin_reload();
            let entries = state.recent.load_recent(state.config.recent_limit).await;
            view.apply_reload(ticket, entries);

            let listed = view.remove(&character, &persona);
            state.recent.delete_entry(&character, &persona).await?;
            println!(
                "{} history for {} / {}",
                "Deleted".green(),
                character,
                persona
            );
            if listed {
                print_entries(view.entries());
            }
        }
    }
    Ok(())
}
