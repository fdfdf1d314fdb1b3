use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;

use super::store::{AuthOutcome, AuthProvider, DatabaseError, RowStore};
use crate::filter::{TableOperation, TableQuery};

/// REST client for the hosted Supabase project (PostgREST + GoTrue)
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(url: &str, anon_key: &str, timeout: Duration) -> Result<Self, DatabaseError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Turn a response into JSON, or into an upstream error carrying the provider's message
    async fn read_json(response: Response) -> Result<Value, DatabaseError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(DatabaseError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| DatabaseError::Decode(e.to_string()))
    }
}

/// Pull a human-readable message out of a PostgREST or GoTrue error body
fn upstream_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| text.to_string())
}

#[async_trait]
impl RowStore for SupabaseClient {
    async fn execute(&self, query: TableQuery) -> Result<Value, DatabaseError> {
        let params = query.to_params()?;
        let url = self.rest_url(query.table());
        debug!(table = query.table(), operation = query.operation().name(), "supabase row request");

        let builder = match query.operation() {
            TableOperation::Select { .. } => self.request(Method::GET, url),
            TableOperation::Insert { .. } => self
                .request(Method::POST, url)
                .header("Prefer", "return=representation"),
            TableOperation::Upsert { .. } => self
                .request(Method::POST, url)
                .header("Prefer", "resolution=merge-duplicates,return=representation"),
            TableOperation::Update { .. } => self
                .request(Method::PATCH, url)
                .header("Prefer", "return=representation"),
            TableOperation::Delete => self
                .request(Method::DELETE, url)
                .header("Prefer", "return=representation"),
        };

        let builder = builder.query(&params);
        let builder = match query.operation().body() {
            Some(body) => builder.json(&body),
            None => builder,
        };

        let response = builder.send().await?;
        let body = Self::read_json(response).await?;
        Ok(if body.is_null() { json!([]) } else { body })
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthOutcome, DatabaseError> {
        let response = self
            .request(Method::POST, self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(AuthOutcome::from_response(Self::read_json(response).await?))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthOutcome, DatabaseError> {
        let response = self
            .request(Method::POST, self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(AuthOutcome::from_response(Self::read_json(response).await?))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), DatabaseError> {
        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::read_json(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_prefers_provider_fields() {
        assert_eq!(upstream_message(r#"{"message":"relation does not exist"}"#), "relation does not exist");
        assert_eq!(upstream_message(r#"{"msg":"User already registered"}"#), "User already registered");
        assert_eq!(
            upstream_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(upstream_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = SupabaseClient::new("https://demo.supabase.co/", "anon", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url(), "https://demo.supabase.co");
        assert_eq!(client.rest_url("profiles"), "https://demo.supabase.co/rest/v1/profiles");
    }
}
