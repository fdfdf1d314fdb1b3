use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{FilterError, TableQuery};

/// Errors from the identity/row-store provider
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("JSON object requested, multiple (or no) rows returned: {0} rows")]
    MultipleRows(usize),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Row operations keyed by table name
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Run one query and return the provider's row payload untouched
    async fn execute(&self, query: TableQuery) -> Result<Value, DatabaseError>;

    /// Single-row lookup; `None` when nothing matched
    async fn fetch_single(&self, query: TableQuery) -> Result<Option<Map<String, Value>>, DatabaseError> {
        match self.execute(query).await? {
            Value::Array(rows) if rows.is_empty() => Ok(None),
            Value::Array(mut rows) if rows.len() == 1 => match rows.remove(0) {
                Value::Object(row) => Ok(Some(row)),
                other => Err(DatabaseError::Decode(format!("expected row object, got {}", other))),
            },
            Value::Array(rows) => Err(DatabaseError::MultipleRows(rows.len())),
            Value::Object(row) => Ok(Some(row)),
            Value::Null => Ok(None),
            other => Err(DatabaseError::Decode(format!("expected row list, got {}", other))),
        }
    }
}

/// Result of a sign-up or password sign-in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthOutcome {
    pub user: Option<Value>,
    pub session: Option<Value>,
}

impl AuthOutcome {
    /// Accepts both the bare-user and the session-wrapped response shapes
    pub fn from_response(body: Value) -> Self {
        if body.get("access_token").is_some() {
            let user = body.get("user").filter(|u| !u.is_null()).cloned();
            return Self { user, session: Some(body) };
        }
        if let Some(user) = body.get("user").filter(|u| !u.is_null()) {
            let session = body.get("session").filter(|s| !s.is_null()).cloned();
            return Self { user: Some(user.clone()), session };
        }
        if body.get("id").is_some() {
            return Self { user: Some(body), session: None };
        }
        Self::default()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref()?.get("id")?.as_str()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user.as_ref()?.get("email")?.as_str()
    }
}

/// Identity operations of the same provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthOutcome, DatabaseError>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthOutcome, DatabaseError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), DatabaseError>;
}
