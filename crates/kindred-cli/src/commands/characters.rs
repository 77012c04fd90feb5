use anyhow::{Result, anyhow};
use clap::Subcommand;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use kindred_core::character::{Character, CharacterRequest};
use kindred_core::record::RecordKind;

use super::import_image;
use crate::app::AppState;

#[derive(Subcommand)]
pub enum CharacterAction {
    /// List all characters
    List,
    /// Show one character as JSON
    Show { id: String },
    /// Create a character
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        tagline: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        greeting: String,
        #[arg(long, default_value = "")]
        definition: String,
        /// Image file copied into the assets directory
        #[arg(long)]
        image: Option<PathBuf>,
        /// Tag as `group=value`, repeatable
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// Delete a character with its chat history and image
    Delete { id: String },
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    let (group, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected group=value, got '{}'", raw))?;
    let (group, value) = (group.trim(), value.trim());
    if group.is_empty() || value.is_empty() {
        return Err(format!("expected group=value, got '{}'", raw));
    }
    Ok((group.to_string(), value.to_string()))
}

fn group_tags(tags: Vec<(String, String)>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (group, value) in tags {
        grouped.entry(group).or_default().push(value);
    }
    grouped
}

fn print_row(character: &Character) {
    let last_used = character
        .last_used
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "{}  {}  {}",
        character.id.bright_cyan(),
        character.name.bold(),
        format!("({}; last used {})", character.tagline, last_used).bright_black()
    );
}

pub async fn run(state: &AppState, action: CharacterAction) -> Result<()> {
    match action {
        CharacterAction::List => {
            let characters = state.records.list_characters().await?;
            if characters.is_empty() {
                println!("{}", "No characters yet.".bright_black());
            }
            for character in &characters {
                print_row(character);
            }
        }
        CharacterAction::Show { id } => {
            let character = state.records.load_character(&id).await?;
            println!("{}", serde_json::to_string_pretty(&character)?);
        }
        CharacterAction::Create {
            name,
            tagline,
            description,
            greeting,
            definition,
            image,
            tags,
        } => {
            let mut request = CharacterRequest {
                name,
                tagline,
                description,
                greeting,
                definition,
                img: None,
                tags: group_tags(tags),
            };
            request.validate().map_err(|e| anyhow!(e))?;
            if let Some(path) = image {
                request.img = Some(import_image(state, RecordKind::Character, &path).await?);
            }
            let character = state.records.create_character(request).await?;
            println!("{} {}", "Created".green(), character.id.bright_cyan());
        }
        CharacterAction::Delete { id } => {
            state.records.delete_character(&id).await?;
            println!("{} {}", "Deleted".green(), id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag("genre = fantasy").unwrap(),
            ("genre".to_string(), "fantasy".to_string())
        );
        assert!(parse_tag("fantasy").is_err());
        assert!(parse_tag("genre=").is_err());
    }

    #[test]
    fn test_group_tags() {
        let grouped = group_tags(vec![
            ("genre".to_string(), "fantasy".to_string()),
            ("rating".to_string(), "sfw".to_string()),
            ("genre".to_string(), "romance".to_string()),
        ]);
        assert_eq!(grouped["genre"], vec!["fantasy", "romance"]);
        assert_eq!(grouped["rating"], vec!["sfw"]);
    }
}
