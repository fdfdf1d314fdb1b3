use std::time::Duration;

use axum::body::Bytes;
use reqwest::Method;
use tracing::debug;
use url::Url;

use super::error::InvestEaseError;

const JSON: &str = "application/json";

/// An inbound request to be forwarded under the sandbox base URL
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path below the proxy prefix, without a leading slash
    pub path: String,
    /// Raw query string, forwarded unchanged
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: Bytes,
}

/// Upstream answer relayed back to the caller verbatim
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Transparent pass-through to the sandbox, attaching the team token
#[derive(Debug, Clone)]
pub struct InvestEaseProxy {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl InvestEaseProxy {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, InvestEaseError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the sub-path onto the base URL; dot-segments are refused
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Result<Url, InvestEaseError> {
        let path = path.trim_start_matches('/');
        if path.split('/').any(|segment| segment == ".." || segment == ".") {
            return Err(InvestEaseError::Invalid(format!("Invalid proxy path: {}", path)));
        }

        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    pub async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, InvestEaseError> {
        let token = self.token.as_deref().ok_or(InvestEaseError::NotConfigured)?;
        let url = self.upstream_url(&request.path, request.query.as_deref())?;
        debug!(method = %request.method, %url, "investease proxy");

        let sends_body = !matches!(request.method, Method::GET | Method::HEAD) && !request.body.is_empty();
        let mut builder = self
            .http
            .request(request.method, url)
            .bearer_auth(token)
            .header("Content-Type", request.content_type.as_deref().unwrap_or(JSON))
            .header("Accept", request.accept.as_deref().unwrap_or(JSON));
        if sends_body {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(ProxyResponse { status, content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> InvestEaseProxy {
        InvestEaseProxy::new("https://sandbox.example.com/dev/", Some("jwt".into()), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn upstream_url_keeps_path_and_query() {
        let url = proxy().upstream_url("/clients/c1/portfolios", Some("limit=5&x=a%20b")).unwrap();
        assert_eq!(url.as_str(), "https://sandbox.example.com/dev/clients/c1/portfolios?limit=5&x=a%20b");

        let url = proxy().upstream_url("clients", Some("")).unwrap();
        assert_eq!(url.as_str(), "https://sandbox.example.com/dev/clients");
    }

    #[test]
    fn dot_segments_are_refused() {
        assert!(matches!(proxy().upstream_url("../admin", None), Err(InvestEaseError::Invalid(_))));
        assert!(matches!(proxy().upstream_url("clients/./x", None), Err(InvestEaseError::Invalid(_))));
    }

    #[tokio::test]
    async fn forward_without_token_is_not_configured() {
        let proxy = InvestEaseProxy::new("http://127.0.0.1:9", None, Duration::from_millis(200)).unwrap();
        let request = ProxyRequest {
            method: Method::GET,
            path: "clients".into(),
            query: None,
            content_type: None,
            accept: None,
            body: Bytes::new(),
        };
        assert!(matches!(proxy.forward(request).await, Err(InvestEaseError::NotConfigured)));
    }
}
