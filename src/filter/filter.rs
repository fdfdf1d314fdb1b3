use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterSpec, OrderSpec, SelectRequest, MAX_LIMIT, MIN_LIMIT};

/// What a table request does once it reaches the row store
#[derive(Debug, Clone, PartialEq)]
pub enum TableOperation {
    Select { columns: String },
    Insert { rows: Vec<Map<String, Value>> },
    Upsert { rows: Vec<Map<String, Value>>, on_conflict: Option<String> },
    Update { values: Map<String, Value> },
    Delete,
}

impl TableOperation {
    pub fn name(&self) -> &'static str {
        match self {
            TableOperation::Select { .. } => "select",
            TableOperation::Insert { .. } => "insert",
            TableOperation::Upsert { .. } => "upsert",
            TableOperation::Update { .. } => "update",
            TableOperation::Delete => "delete",
        }
    }

    /// JSON payload sent upstream, if the operation has one
    pub fn body(&self) -> Option<Value> {
        match self {
            TableOperation::Insert { rows } | TableOperation::Upsert { rows, .. } => {
                Some(Value::Array(rows.iter().cloned().map(Value::Object).collect()))
            }
            TableOperation::Update { values } => Some(Value::Object(values.clone())),
            TableOperation::Select { .. } | TableOperation::Delete => None,
        }
    }
}

/// A single round trip against one table: operation plus filters, order and limit
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    operation: TableOperation,
    filters: Vec<FilterSpec>,
    order: Option<OrderSpec>,
    limit: Option<i64>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>, operation: TableOperation) -> Result<Self, FilterError> {
        let table = table.into();
        Self::validate_table_name(&table)?;
        Ok(Self {
            table,
            operation,
            filters: vec![],
            order: None,
            limit: None,
        })
    }

    pub fn select(table: impl Into<String>, columns: impl Into<String>) -> Result<Self, FilterError> {
        Self::new(table, TableOperation::Select { columns: columns.into() })
    }

    pub fn insert(table: impl Into<String>, rows: Vec<Map<String, Value>>) -> Result<Self, FilterError> {
        Self::new(table, TableOperation::Insert { rows })
    }

    pub fn upsert(
        table: impl Into<String>,
        rows: Vec<Map<String, Value>>,
        on_conflict: Option<String>,
    ) -> Result<Self, FilterError> {
        Self::new(table, TableOperation::Upsert { rows, on_conflict })
    }

    pub fn update(table: impl Into<String>, values: Map<String, Value>) -> Result<Self, FilterError> {
        Self::new(table, TableOperation::Update { values })
    }

    pub fn delete(table: impl Into<String>) -> Result<Self, FilterError> {
        Self::new(table, TableOperation::Delete)
    }

    /// Apply a frontend select body: filters, order and limit
    pub fn assign(self, data: SelectRequest) -> Result<Self, FilterError> {
        let mut query = self.filters(data.filters.unwrap_or_default())?;
        if let Some(order) = data.order {
            query = query.order(order)?;
        }
        if let Some(limit) = data.limit {
            query = query.limit(limit)?;
        }
        Ok(query)
    }

    pub fn filter(self, spec: FilterSpec) -> Result<Self, FilterError> {
        self.filters(vec![spec])
    }

    pub fn filters(mut self, specs: Vec<FilterSpec>) -> Result<Self, FilterError> {
        FilterWhere::validate(&specs)?;
        self.filters.extend(specs);
        Ok(self)
    }

    /// Equality filter for internal callers with known-good columns
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FilterSpec::new(column, FilterOp::Eq, value));
        self
    }

    pub fn order(mut self, order: OrderSpec) -> Result<Self, FilterError> {
        FilterOrder::validate(&order)?;
        self.order = Some(order);
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self, FilterError> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(FilterError::InvalidLimit(format!(
                "limit must be between {} and {}, got {}",
                MIN_LIMIT, MAX_LIMIT, limit
            )));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn operation(&self) -> &TableOperation {
        &self.operation
    }

    pub fn filter_specs(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    /// PostgREST query string pairs for this request
    pub fn to_params(&self) -> Result<Vec<(String, String)>, FilterError> {
        let mut params = Vec::new();

        match &self.operation {
            TableOperation::Select { columns } => params.push(("select".to_string(), columns.clone())),
            TableOperation::Upsert { on_conflict: Some(columns), .. } => {
                params.push(("on_conflict".to_string(), columns.clone()))
            }
            _ => {}
        }

        for filter in &self.filters {
            params.push(FilterWhere::to_param(filter)?);
        }

        if let Some(order) = &self.order {
            params.push(("order".to_string(), FilterOrder::generate(order)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        Ok(params)
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        let mut chars = name.chars();
        let first_ok = chars.next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false);
        if !first_ok || !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }
}
