use clap::Subcommand;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::investease::InvestEaseClient;

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "Create a client with starting cash")]
    Create {
        #[arg(help = "Client name")]
        name: String,
        #[arg(help = "Client email")]
        email: String,
        #[arg(long, default_value_t = 0.0, help = "Starting cash")]
        cash: f64,
    },

    #[command(about = "List all clients of the team")]
    List,

    #[command(about = "Show one client")]
    Get {
        #[arg(help = "Client ID")]
        id: String,
    },

    #[command(about = "Change a client's name and/or email")]
    Update {
        #[arg(help = "Client ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    #[command(about = "Delete a client")]
    Delete {
        #[arg(help = "Client ID")]
        id: String,
    },

    #[command(about = "Add cash to a client")]
    Deposit {
        #[arg(help = "Client ID")]
        id: String,
        #[arg(help = "Amount, must be positive", allow_negative_numbers = true)]
        amount: f64,
    },

    #[command(about = "Simulate all of a client's portfolios forward")]
    Simulate {
        #[arg(help = "Client ID")]
        id: String,
        #[arg(long, default_value_t = 12, help = "Months to simulate (1-12)")]
        months: u32,
    },
}

pub async fn handle(client: &InvestEaseClient, cmd: ClientCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::Create { name, email, cash } => {
            let created = client.create_client(&name, &email, cash).await?;
            output_success(&output_format, &format!("Client '{}' created", name), created)
        }
        ClientCommands::List => {
            let clients = client.list_clients().await?;
            output_collection(&output_format, "clients", clients, |c| {
                format!("{:<38} {:<20} {}", field(c, "id"), field(c, "name"), field(c, "email"))
            })
        }
        ClientCommands::Get { id } => {
            let found = client.get_client(&id).await?;
            output_success(&output_format, &format!("Client {}", id), found)
        }
        ClientCommands::Update { id, name, email } => {
            let updated = client.update_client(&id, name.as_deref(), email.as_deref()).await?;
            output_success(&output_format, &format!("Client {} updated", id), updated)
        }
        ClientCommands::Delete { id } => {
            let deleted = client.delete_client(&id).await?;
            output_success(&output_format, &format!("Client {} deleted", id), deleted)
        }
        ClientCommands::Deposit { id, amount } => {
            let result = client.deposit(&id, amount).await?;
            output_success(&output_format, &format!("Deposited {} to client {}", amount, id), result)
        }
        ClientCommands::Simulate { id, months } => {
            let result = client.simulate_client(&id, months).await?;
            output_success(&output_format, &format!("Simulated {} months for client {}", months, id), result)
        }
    }
}
