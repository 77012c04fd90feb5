use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::app::AppState;

#[derive(Subcommand)]
pub enum ServiceAction {
    /// Start the backend services and keep them running until Ctrl-C
    Start,
    /// Report whether the inference API answers
    Status,
}

pub async fn run(state: &AppState, action: ServiceAction) -> Result<()> {
    match action {
        ServiceAction::Start => {
            state.bootstrapper.ensure_services_started().await?;
            println!(
                "{} {}",
                "Services running at".green(),
                state.config.api_base_url
            );
            println!("{}", "Press Ctrl-C to stop.".bright_black());
            tokio::signal::ctrl_c().await?;
        }
        ServiceAction::Status => {
            if state.bootstrapper.check_health().await {
                println!("{} {}", "Available:".green(), state.config.api_base_url);
            } else {
                println!("{} {}", "Unavailable:".red(), state.config.api_base_url);
            }
        }
    }
    Ok(())
}
