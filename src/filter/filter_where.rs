use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterSpec};

/// Query parameters PostgREST reads as controls rather than column filters
pub const RESERVED_PARAMS: [&str; 8] = ["select", "order", "limit", "offset", "or", "and", "not", "on_conflict"];

/// Translates validated filters into PostgREST `column=op.value` query pairs
pub struct FilterWhere;

impl FilterWhere {
    /// Structural check run before anything is dispatched upstream
    pub fn validate(filters: &[FilterSpec]) -> Result<(), FilterError> {
        for filter in filters {
            Self::to_param(filter)?;
        }
        Ok(())
    }

    pub fn to_param(filter: &FilterSpec) -> Result<(String, String), FilterError> {
        if filter.column.trim().is_empty() {
            return Err(FilterError::InvalidColumn("Filter column cannot be empty".to_string()));
        }
        if RESERVED_PARAMS.contains(&filter.column.trim()) {
            return Err(FilterError::InvalidColumn(format!(
                "Filter column '{}' is a reserved query parameter",
                filter.column
            )));
        }
        let condition = match filter.op {
            FilterOp::Eq
            | FilterOp::Neq
            | FilterOp::Gt
            | FilterOp::Gte
            | FilterOp::Lt
            | FilterOp::Lte
            | FilterOp::Like
            | FilterOp::ILike => format!("{}.{}", filter.op, Self::scalar(&filter.value)),
            FilterOp::Is => format!("is.{}", Self::is_operand(&filter.value)?),
            FilterOp::In => format!("in.({})", Self::list_operand(&filter.value)?),
        };
        Ok((filter.column.clone(), condition))
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }

    fn is_operand(value: &Value) -> Result<String, FilterError> {
        match value {
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::String(s) => Ok(s.clone()),
            _ => Err(FilterError::InvalidOperatorData(
                "Filter 'is' expects null, true or false".to_string(),
            )),
        }
    }

    fn list_operand(value: &Value) -> Result<String, FilterError> {
        let items = value.as_array().ok_or_else(|| {
            FilterError::InvalidOperatorData("Filter 'in' expects list value".to_string())
        })?;
        Ok(items.iter().map(Self::list_item).collect::<Vec<_>>().join(","))
    }

    // PostgREST reserves these characters inside in.(...) lists
    fn list_item(value: &Value) -> String {
        let raw = Self::scalar(value);
        let needs_quotes = raw.is_empty()
            || raw
                .chars()
                .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace());
        if matches!(value, Value::String(_)) && needs_quotes {
            format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
        } else {
            raw
        }
    }
}
