use anyhow::{Result, anyhow};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use kindred_core::persona::PersonaRequest;
use kindred_core::record::RecordKind;

use super::import_image;
use crate::app::AppState;

#[derive(Subcommand)]
pub enum PersonaAction {
    /// List all personas
    List,
    /// Show one persona as JSON
    Show { id: String },
    /// Create a persona
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        background: String,
        /// Image file copied into the assets directory
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a persona
    Delete { id: String },
}

pub async fn run(state: &AppState, action: PersonaAction) -> Result<()> {
    match action {
        PersonaAction::List => {
            let personas = state.records.list_personas().await?;
            if personas.is_empty() {
                println!("{}", "No personas yet.".bright_black());
            }
            for persona in &personas {
                println!("{}  {}", persona.id.bright_cyan(), persona.display_name.bold());
            }
        }
        PersonaAction::Show { id } => {
            let persona = state.records.load_persona(&id).await?;
            println!("{}", serde_json::to_string_pretty(&persona)?);
        }
        PersonaAction::Create {
            name,
            background,
            image,
        } => {
            let mut request = PersonaRequest {
                display_name: name,
                background,
                img: None,
            };
            request.validate().map_err(|e| anyhow!(e))?;
            if let Some(path) = image {
                request.img = Some(import_image(state, RecordKind::Persona, &path).await?);
            }
            let persona = state.records.create_persona(request).await?;
            println!("{} {}", "Created".green(), persona.id.bright_cyan());
        }
        PersonaAction::Delete { id } => {
            state.records.delete_persona(&id).await?;
            println!("{} {}", "Deleted".green(), id);
        }
    }
    Ok(())
}
