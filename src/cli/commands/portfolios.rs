use clap::Subcommand;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::investease::{InvestEaseClient, Strategy};

#[derive(Subcommand)]
pub enum PortfolioCommands {
    #[command(about = "Open a portfolio for a client")]
    Create {
        #[arg(help = "Client ID")]
        client_id: String,
        #[arg(value_enum, help = "Investment strategy")]
        strategy: Strategy,
        #[arg(help = "Initial amount, must be positive", allow_negative_numbers = true)]
        initial_amount: f64,
    },

    #[command(about = "List a client's portfolios")]
    List {
        #[arg(help = "Client ID")]
        client_id: String,
    },

    #[command(about = "Show one portfolio")]
    Get {
        #[arg(help = "Portfolio ID")]
        id: String,
    },

    #[command(about = "Move client cash into a portfolio")]
    Transfer {
        #[arg(help = "Portfolio ID")]
        id: String,
        #[arg(help = "Amount, must be positive", allow_negative_numbers = true)]
        amount: f64,
    },

    #[command(about = "Move portfolio value back to client cash")]
    Withdraw {
        #[arg(help = "Portfolio ID")]
        id: String,
        #[arg(help = "Amount, must be positive", allow_negative_numbers = true)]
        amount: f64,
    },

    #[command(about = "Performance analysis of a portfolio")]
    Analysis {
        #[arg(help = "Portfolio ID")]
        id: String,
    },
}

pub async fn handle(
    client: &InvestEaseClient,
    cmd: PortfolioCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        PortfolioCommands::Create { client_id, strategy, initial_amount } => {
            let created = client.create_portfolio(&client_id, strategy, initial_amount).await?;
            output_success(
                &output_format,
                &format!("Portfolio ({}) created for client {}", strategy.as_str(), client_id),
                created,
            )
        }
        PortfolioCommands::List { client_id } => {
            let portfolios = client.list_portfolios(&client_id).await?;
            output_collection(&output_format, "portfolios", portfolios, |p| {
                format!("{:<38} {}", field(p, "id"), field(p, "type"))
            })
        }
        PortfolioCommands::Get { id } => {
            let found = client.get_portfolio(&id).await?;
            output_success(&output_format, &format!("Portfolio {}", id), found)
        }
        PortfolioCommands::Transfer { id, amount } => {
            let result = client.transfer_to_portfolio(&id, amount).await?;
            output_success(&output_format, &format!("Transferred {} into portfolio {}", amount, id), result)
        }
        PortfolioCommands::Withdraw { id, amount } => {
            let result = client.withdraw_from_portfolio(&id, amount).await?;
            output_success(&output_format, &format!("Withdrew {} from portfolio {}", amount, id), result)
        }
        PortfolioCommands::Analysis { id } => {
            let analysis = client.get_portfolio_analysis(&id).await?;
            output_success(&output_format, &format!("Analysis of portfolio {}", id), analysis)
        }
    }
}
