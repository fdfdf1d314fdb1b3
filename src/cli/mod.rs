pub mod commands;
pub mod utils;

use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_INVESTEASE_BASE_URL;
use crate::investease::InvestEaseClient;

#[derive(Parser)]
#[command(name = "investease")]
#[command(about = "InvestEase CLI - Command-line client for the portfolio-simulation sandbox")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "INVESTEASE_BASE_URL", default_value = DEFAULT_INVESTEASE_BASE_URL)]
    pub base_url: String,

    #[arg(long, global = true, env = "INVESTEASE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, default_value_t = 30, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Register a team and print its token")]
    Register {
        #[arg(help = "Team name")]
        team_name: String,
        #[arg(help = "Contact email")]
        contact_email: String,
    },

    #[command(about = "Client management")]
    Clients {
        #[command(subcommand)]
        cmd: commands::clients::ClientCommands,
    },

    #[command(about = "Portfolio management")]
    Portfolios {
        #[command(subcommand)]
        cmd: commands::portfolios::PortfolioCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = InvestEaseClient::new(&cli.base_url, cli.token, Duration::from_secs(cli.timeout))?;

    match cli.command {
        Commands::Register { team_name, contact_email } => {
            commands::team::register(&client, &team_name, &contact_email, output_format).await
        }
        Commands::Clients { cmd } => commands::clients::handle(&client, cmd, output_format).await,
        Commands::Portfolios { cmd } => commands::portfolios::handle(&client, cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::portfolios::PortfolioCommands;
    use crate::investease::Strategy;

    #[test]
    fn portfolio_create_takes_snake_case_strategy() {
        let cli = Cli::try_parse_from(["investease", "portfolios", "create", "c1", "aggressive_growth", "100"]).unwrap();
        match cli.command {
            Commands::Portfolios { cmd: PortfolioCommands::Create { client_id, strategy, initial_amount } } => {
                assert_eq!(client_id, "c1");
                assert_eq!(strategy, Strategy::AggressiveGrowth);
                assert_eq!(initial_amount, 100.0);
            }
            _ => panic!("expected portfolios create"),
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["investease", "portfolios", "create", "c1", "yolo", "100"]).is_err());
    }
}
