use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::database::profiles::{self, INVESTEASE_COLUMNS};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNameRequest {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignOutRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInvestEaseRequest {
    pub email: String,
    pub invest_ease_client_id: String,
}

/// GET /get-name?user_id= - Display name of one profile
pub async fn get_name(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> ApiResult {
    profile_field(&state, &query.user_id, "name", "Name not found", "Get name error").await
}

/// GET /get-email?user_id= - Email of one profile
pub async fn get_email(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> ApiResult {
    profile_field(&state, &query.user_id, "email", "Email not found", "Get email error").await
}

async fn profile_field(
    state: &AppState,
    user_id: &str,
    column: &str,
    missing: &str,
    context: &str,
) -> ApiResult {
    let value = profiles::find_profile_field(state.rows()?, user_id, column)
        .await
        .map_err(|e| ApiError::upstream(context, e))?
        .ok_or_else(|| ApiError::not_found(missing))?;

    let mut body = Map::new();
    body.insert(column.to_string(), value);
    Ok(Json(Value::Object(body)))
}

/// POST /post-name - Rename one profile
pub async fn post_name(State(state): State<AppState>, ApiJson(payload): ApiJson<UpdateNameRequest>) -> ApiResult {
    let mut values = Map::new();
    values.insert("name".to_string(), json!(payload.name));

    profiles::update_profile(state.rows()?, "id", &payload.user_id, values)
        .await
        .map_err(|e| ApiError::upstream("Post name error", e))?;

    Ok(Json(json!({ "message": "Name updated" })))
}

/// POST /signup - Create the identity, then its profile row
///
/// The two writes are not atomic. When the profile insert fails the identity
/// already exists; the call still fails as a whole and the orphaned id is logged.
pub async fn signup(State(state): State<AppState>, ApiJson(payload): ApiJson<SignUpRequest>) -> ApiResult {
    const CONTEXT: &str = "Sign up error";

    let outcome = state
        .auth()?
        .sign_up(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::upstream(CONTEXT, e))?;

    let user_id = outcome
        .user_id()
        .ok_or_else(|| ApiError::upstream(CONTEXT, "Sign up failed"))?;

    if let Err(e) = profiles::insert_profile(state.rows()?, user_id, &payload.name, &payload.email).await {
        warn!(user_id, error = %e, "identity created without profile row");
        return Err(ApiError::upstream(CONTEXT, e));
    }

    Ok(Json(json!({
        "message": "Sign up successful",
        "user": outcome.user
    })))
}

/// POST /login - Password sign-in
pub async fn login(State(state): State<AppState>, ApiJson(payload): ApiJson<LoginRequest>) -> ApiResult {
    const CONTEXT: &str = "Login error";

    let outcome = state
        .auth()?
        .sign_in_with_password(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::upstream(CONTEXT, e))?;

    if outcome.session.is_none() {
        return Err(ApiError::upstream(CONTEXT, "Invalid credentials"));
    }

    Ok(Json(json!({
        "message": "Login successful",
        "user_id": outcome.user_id(),
        "email": outcome.user_email()
    })))
}

/// POST /signout - Revoke the caller's session
pub async fn signout(State(state): State<AppState>, ApiJson(payload): ApiJson<SignOutRequest>) -> ApiResult {
    state
        .auth()?
        .sign_out(&payload.access_token)
        .await
        .map_err(|e| ApiError::upstream("Sign out error", e))?;

    Ok(Json(json!({ "message": "Signed out" })))
}

/// POST /set-investease - Store the sandbox client id on the profile with this email
///
/// Profile schemas differ in how the column is spelled, so each known spelling
/// is tried in turn and the first accepted one is reported back.
pub async fn set_investease(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SetInvestEaseRequest>,
) -> ApiResult {
    let store = state.rows()?;
    let mut last_error = None;

    for column in INVESTEASE_COLUMNS {
        let mut values = Map::new();
        values.insert(column.to_string(), json!(payload.invest_ease_client_id));

        match profiles::update_profile(store, "email", &payload.email, values).await {
            Ok(_) => return Ok(Json(json!({ "message": "Saved", "column": column }))),
            Err(e) => last_error = Some(e),
        }
    }

    let last = last_error.map(|e| e.to_string()).unwrap_or_default();
    Err(ApiError::upstream(
        "set_investease error",
        format!("Failed to save investEaseClientId: {}", last),
    ))
}
