use super::error::FilterError;
use super::types::OrderSpec;

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate(order: &OrderSpec) -> Result<(), FilterError> {
        if order.column.trim().is_empty() {
            return Err(FilterError::InvalidColumn("Order column cannot be empty".to_string()));
        }
        Ok(())
    }

    /// `column.asc|desc.nullsfirst|nullslast`, nulls placement always explicit
    pub fn generate(order: &OrderSpec) -> String {
        let direction = if order.ascending { "asc" } else { "desc" };
        let nulls = if order.nullsfirst { "nullsfirst" } else { "nullslast" };
        format!("{}.{}.{}", order.column, direction, nulls)
    }
}
