use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::filter::{FilterError, FilterSpec, Rows, SelectRequest, TableQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InsertPayload {
    pub rows: Rows,
}

#[derive(Debug, Deserialize)]
pub struct UpsertPayload {
    pub rows: Rows,
    pub on_conflict: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub values: Map<String, Value>,
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePayload {
    pub filters: Vec<FilterSpec>,
}

fn ensure_allowed(state: &AppState, table: &str) -> Result<(), ApiError> {
    if state.config.tables.is_allowed(table) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Table not allowed"))
    }
}

/// Validate, then make the single upstream round trip
async fn run(state: &AppState, query: Result<TableQuery, FilterError>, context: &str) -> ApiResult {
    let query = query?;
    let data = state
        .rows()?
        .execute(query)
        .await
        .map_err(|e| ApiError::upstream(context, e))?;
    Ok(Json(json!({ "data": data })))
}

/// GET /sb/health - Confirms the provider URL without exposing the key
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "url": state.config.supabase.url }))
}

/// POST /sb/select/:table - Filtered, ordered, limited read
pub async fn select(
    State(state): State<AppState>,
    Path(table): Path<String>,
    ApiJson(payload): ApiJson<SelectRequest>,
) -> ApiResult {
    ensure_allowed(&state, &table)?;
    let columns = payload.columns.clone();
    let query = TableQuery::select(table, columns).and_then(|q| q.assign(payload));
    run(&state, query, "Select failed").await
}

/// POST /sb/insert/:table - One row or many
pub async fn insert(
    State(state): State<AppState>,
    Path(table): Path<String>,
    ApiJson(payload): ApiJson<InsertPayload>,
) -> ApiResult {
    ensure_allowed(&state, &table)?;
    run(&state, TableQuery::insert(table, payload.rows.into_vec()), "Insert failed").await
}

/// POST /sb/upsert/:table - Insert or merge on the conflict target
pub async fn upsert(
    State(state): State<AppState>,
    Path(table): Path<String>,
    ApiJson(payload): ApiJson<UpsertPayload>,
) -> ApiResult {
    ensure_allowed(&state, &table)?;
    let on_conflict = payload.on_conflict.filter(|c| !c.trim().is_empty());
    run(&state, TableQuery::upsert(table, payload.rows.into_vec(), on_conflict), "Upsert failed").await
}

/// POST /sb/update/:table - Set values on the filtered rows
pub async fn update(
    State(state): State<AppState>,
    Path(table): Path<String>,
    ApiJson(payload): ApiJson<UpdatePayload>,
) -> ApiResult {
    ensure_allowed(&state, &table)?;
    let query = TableQuery::update(table, payload.values).and_then(|q| q.filters(payload.filters));
    run(&state, query, "Update failed").await
}

/// POST /sb/delete/:table - Remove the filtered rows
pub async fn delete(
    State(state): State<AppState>,
    Path(table): Path<String>,
    ApiJson(payload): ApiJson<DeletePayload>,
) -> ApiResult {
    ensure_allowed(&state, &table)?;
    let query = TableQuery::delete(table).and_then(|q| q.filters(payload.filters));
    run(&state, query, "Delete failed").await
}
