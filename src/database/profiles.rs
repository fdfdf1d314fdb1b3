use serde_json::{json, Map, Value};

use super::store::{DatabaseError, RowStore};
use crate::filter::TableQuery;

pub const PROFILES_TABLE: &str = "profiles";
pub const STATS_COLUMNS: [&str; 4] = ["points", "eggs", "streak", "level"];

/// Candidate column names for the InvestEase client id, tried in order
pub const INVESTEASE_COLUMNS: [&str; 3] = [
    "investease_client_id",
    "invest_ease_client_id",
    "investEaseClientId",
];

/// Fetch the selected columns of one profile row by id
pub async fn find_profile(
    store: &dyn RowStore,
    user_id: &str,
    columns: &str,
) -> Result<Option<Map<String, Value>>, DatabaseError> {
    let query = TableQuery::select(PROFILES_TABLE, columns)?.eq("id", user_id);
    store.fetch_single(query).await
}

/// Fetch a single column, `None` when the row or the column is missing
pub async fn find_profile_field(
    store: &dyn RowStore,
    user_id: &str,
    column: &str,
) -> Result<Option<Value>, DatabaseError> {
    let row = find_profile(store, user_id, column).await?;
    Ok(row.and_then(|mut r| r.remove(column)))
}

pub async fn insert_profile(
    store: &dyn RowStore,
    user_id: &str,
    name: &str,
    email: &str,
) -> Result<Value, DatabaseError> {
    let row = json!({ "id": user_id, "name": name, "email": email });
    let rows = row.as_object().cloned().into_iter().collect();
    store.execute(TableQuery::insert(PROFILES_TABLE, rows)?).await
}

/// Update only the given columns of the row matching `key_column = key`
pub async fn update_profile(
    store: &dyn RowStore,
    key_column: &str,
    key: &str,
    values: Map<String, Value>,
) -> Result<Value, DatabaseError> {
    let query = TableQuery::update(PROFILES_TABLE, values)?.eq(key_column, key);
    store.execute(query).await
}
