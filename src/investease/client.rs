use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use super::error::InvestEaseError;
use super::types::{Strategy, MAX_SIMULATION_MONTHS, MIN_SIMULATION_MONTHS};

/// Typed client for the InvestEase portfolio-simulation sandbox.
///
/// Every operation is one request. Inputs are checked locally first: amounts
/// must be positive, simulations run for 1..=12 months and a client update
/// needs at least one field. Non-2xx answers become [`InvestEaseError::Api`].
#[derive(Debug, Clone)]
pub struct InvestEaseClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl InvestEaseClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, InvestEaseError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url.trim_end_matches('/'))?,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, InvestEaseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| InvestEaseError::Invalid(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, segments: &[&str], body: Option<Value>) -> Result<Value, InvestEaseError> {
        let url = self.url_for(segments)?;
        debug!(%method, %url, "investease request");

        let mut builder = self.http.request(method, url).header("Content-Type", "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| text.clone());
            return Err(InvestEaseError::Api {
                status: status.as_u16(),
                message,
                payload,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    // ---------- Teams ----------

    /// POST /teams/register - returns the team record including `jwtToken`
    pub async fn register(&self, team_name: &str, contact_email: &str) -> Result<Value, InvestEaseError> {
        let body = json!({ "team_name": team_name, "contact_email": contact_email });
        self.request(Method::POST, &["teams", "register"], Some(body)).await
    }

    // ---------- Clients ----------

    pub async fn create_client(&self, name: &str, email: &str, cash: f64) -> Result<Value, InvestEaseError> {
        let body = json!({ "name": name, "email": email, "cash": cash });
        self.request(Method::POST, &["clients"], Some(body)).await
    }

    pub async fn list_clients(&self) -> Result<Value, InvestEaseError> {
        self.request(Method::GET, &["clients"], None).await
    }

    pub async fn get_client(&self, client_id: &str) -> Result<Value, InvestEaseError> {
        self.request(Method::GET, &["clients", client_id], None).await
    }

    /// PUT /clients/:id - only name and email are updatable
    pub async fn update_client(
        &self,
        client_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Value, InvestEaseError> {
        let mut body = Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(email) = email {
            body.insert("email".to_string(), json!(email));
        }
        if body.is_empty() {
            return Err(InvestEaseError::Invalid(
                "No valid fields to update. Provide name and/or email.".to_string(),
            ));
        }
        self.request(Method::PUT, &["clients", client_id], Some(Value::Object(body))).await
    }

    pub async fn delete_client(&self, client_id: &str) -> Result<Value, InvestEaseError> {
        self.request(Method::DELETE, &["clients", client_id], None).await
    }

    pub async fn deposit(&self, client_id: &str, amount: f64) -> Result<Value, InvestEaseError> {
        ensure_positive(amount, "Amount")?;
        let body = json!({ "amount": amount });
        self.request(Method::POST, &["clients", client_id, "deposit"], Some(body)).await
    }

    // ---------- Portfolios ----------

    pub async fn create_portfolio(
        &self,
        client_id: &str,
        strategy: Strategy,
        initial_amount: f64,
    ) -> Result<Value, InvestEaseError> {
        ensure_positive(initial_amount, "initial_amount")?;
        let body = json!({ "type": strategy, "initialAmount": initial_amount });
        self.request(Method::POST, &["clients", client_id, "portfolios"], Some(body)).await
    }

    pub async fn list_portfolios(&self, client_id: &str) -> Result<Value, InvestEaseError> {
        self.request(Method::GET, &["clients", client_id, "portfolios"], None).await
    }

    pub async fn get_portfolio(&self, portfolio_id: &str) -> Result<Value, InvestEaseError> {
        self.request(Method::GET, &["portfolios", portfolio_id], None).await
    }

    /// Client cash into the portfolio
    pub async fn transfer_to_portfolio(&self, portfolio_id: &str, amount: f64) -> Result<Value, InvestEaseError> {
        ensure_positive(amount, "Amount")?;
        let body = json!({ "amount": amount });
        self.request(Method::POST, &["portfolios", portfolio_id, "transfer"], Some(body)).await
    }

    /// Portfolio back to client cash
    pub async fn withdraw_from_portfolio(&self, portfolio_id: &str, amount: f64) -> Result<Value, InvestEaseError> {
        ensure_positive(amount, "Amount")?;
        let body = json!({ "amount": amount });
        self.request(Method::POST, &["portfolios", portfolio_id, "withdraw"], Some(body)).await
    }

    pub async fn get_portfolio_analysis(&self, portfolio_id: &str) -> Result<Value, InvestEaseError> {
        self.request(Method::GET, &["portfolios", portfolio_id, "analysis"], None).await
    }

    // ---------- Simulations ----------

    /// POST /client/:id/simulate (singular `client` is the upstream's path)
    pub async fn simulate_client(&self, client_id: &str, months: u32) -> Result<Value, InvestEaseError> {
        if !(MIN_SIMULATION_MONTHS..=MAX_SIMULATION_MONTHS).contains(&months) {
            return Err(InvestEaseError::Invalid(format!(
                "months must be in the range {}..{}.",
                MIN_SIMULATION_MONTHS, MAX_SIMULATION_MONTHS
            )));
        }
        let body = json!({ "months": months });
        self.request(Method::POST, &["client", client_id, "simulate"], Some(body)).await
    }
}

fn ensure_positive(amount: f64, field: &str) -> Result<(), InvestEaseError> {
    // NaN fails this comparison too
    if amount > 0.0 {
        Ok(())
    } else {
        Err(InvestEaseError::Invalid(format!("{} must be positive.", field)))
    }
}
