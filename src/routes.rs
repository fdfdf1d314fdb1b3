use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::{account, chat, health, investease, learn, stats, table};
use crate::state::AppState;

/// The complete HTTP surface
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .merge(account_routes())
        .merge(stats_routes())
        .merge(table_routes())
        .merge(chat_routes())
        .merge(learn_routes())
        .merge(investease_routes())
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/get-name", get(account::get_name))
        .route("/post-name", post(account::post_name))
        .route("/get-email", get(account::get_email))
        .route("/signup", post(account::signup))
        .route("/login", post(account::login))
        .route("/signout", post(account::signout))
        .route("/set-investease", post(account::set_investease))
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/get-stats", get(stats::get_stats))
        .route("/post-stats", post(stats::post_stats))
}

fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/sb/health", get(table::health))
        .route("/sb/select/:table", post(table::select))
        .route("/sb/insert/:table", post(table::insert))
        .route("/sb/upsert/:table", post(table::upsert))
        .route("/sb/update/:table", post(table::update))
        .route("/sb/delete/:table", post(table::delete))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/gemini/chat", post(chat::chat))
        .route("/gemini/chat/stream", post(chat::chat_stream))
}

fn learn_routes() -> Router<AppState> {
    Router::new().route("/learn", post(learn::learn))
}

fn investease_routes() -> Router<AppState> {
    Router::new().route("/investease/*path", any(investease::proxy))
}

/// Listed origins with credentials, or anything at all when `*` is configured
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
