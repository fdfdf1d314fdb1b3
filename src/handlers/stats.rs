use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::profiles::{self, STATS_COLUMNS};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::account::UserQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatsRequest {
    pub user_id: String,
    pub points: Option<i64>,
    pub eggs: Option<i64>,
    pub streak: Option<i64>,
    pub level: Option<String>,
}

impl UpdateStatsRequest {
    /// Only the fields the caller actually sent
    pub fn changed_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(points) = self.points {
            fields.insert("points".to_string(), json!(points));
        }
        if let Some(eggs) = self.eggs {
            fields.insert("eggs".to_string(), json!(eggs));
        }
        if let Some(streak) = self.streak {
            fields.insert("streak".to_string(), json!(streak));
        }
        if let Some(level) = &self.level {
            fields.insert("level".to_string(), json!(level));
        }
        fields
    }
}

/// GET /get-stats?user_id= - Game stats of one profile
pub async fn get_stats(State(state): State<AppState>, ApiQuery(query): ApiQuery<UserQuery>) -> ApiResult {
    let row = profiles::find_profile(state.rows()?, &query.user_id, &STATS_COLUMNS.join(","))
        .await
        .map_err(|e| ApiError::upstream("Get stats error", e))?
        .ok_or_else(|| ApiError::not_found("Stats not found"))?;

    let mut stats = Map::new();
    for column in STATS_COLUMNS {
        stats.insert(column.to_string(), row.get(column).cloned().unwrap_or(Value::Null));
    }
    Ok(Json(Value::Object(stats)))
}

/// POST /post-stats - Partial update of game stats
pub async fn post_stats(State(state): State<AppState>, ApiJson(payload): ApiJson<UpdateStatsRequest>) -> ApiResult {
    let fields = payload.changed_fields();
    if fields.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    profiles::update_profile(state.rows()?, "id", &payload.user_id, fields)
        .await
        .map_err(|e| ApiError::upstream("Post stats error", e))?;

    Ok(Json(json!({ "message": "Stats updated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_fields_skips_absent_values() {
        let payload: UpdateStatsRequest = serde_json::from_value(json!({"user_id": "u1", "points": 10})).unwrap();
        assert_eq!(Value::Object(payload.changed_fields()), json!({"points": 10}));

        let payload: UpdateStatsRequest =
            serde_json::from_value(json!({"user_id": "u1", "level": "gosling", "streak": 0})).unwrap();
        assert_eq!(Value::Object(payload.changed_fields()), json!({"level": "gosling", "streak": 0}));
    }
}
