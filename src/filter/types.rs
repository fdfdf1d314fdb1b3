use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FilterError;

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 10_000;

/// Closed set of row filter operators accepted by the table gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum FilterOp {
    #[default]
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    Is,
    In,
}

impl FilterOp {
    pub const ALL: [FilterOp; 10] = [
        FilterOp::Eq,
        FilterOp::Neq,
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::Like,
        FilterOp::ILike,
        FilterOp::Is,
        FilterOp::In,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::ILike => "ilike",
            FilterOp::Is => "is",
            FilterOp::In => "in",
        }
    }
}

impl TryFrom<String> for FilterOp {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FilterOp::ALL
            .into_iter()
            .find(|op| op.as_str() == value)
            .ok_or(FilterError::UnsupportedOperator(value))
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(column, op, value)` triple as sent by the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    #[serde(default)]
    pub op: FilterOp,
    #[serde(default)]
    pub value: Value,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub column: String,
    #[serde(default = "default_true")]
    pub ascending: bool,
    #[serde(default)]
    pub nullsfirst: bool,
}

/// Body of POST /sb/select/:table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    #[serde(default = "default_columns")]
    pub columns: String,
    pub filters: Option<Vec<FilterSpec>>,
    pub limit: Option<i64>,
    pub order: Option<OrderSpec>,
}

impl Default for SelectRequest {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            filters: None,
            limit: None,
            order: None,
        }
    }
}

/// A single row or a list of rows; always dispatched as a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    Many(Vec<Map<String, Value>>),
    One(Map<String, Value>),
}

impl Rows {
    pub fn into_vec(self) -> Vec<Map<String, Value>> {
        match self {
            Rows::Many(rows) => rows,
            Rows::One(row) => vec![row],
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_columns() -> String {
    "*".to_string()
}
