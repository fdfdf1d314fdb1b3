use serde_json::Value;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::investease::InvestEaseClient;

pub async fn register(
    client: &InvestEaseClient,
    team_name: &str,
    contact_email: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let team = client.register(team_name, contact_email).await?;

    if let OutputFormat::Text = output_format {
        if let Some(token) = team.get("jwtToken").and_then(Value::as_str) {
            println!("✓ Team '{}' registered", team_name);
            println!("export INVESTEASE_TOKEN={}", token);
            return Ok(());
        }
    }

    output_success(&output_format, &format!("Team '{}' registered", team_name), team)
}
