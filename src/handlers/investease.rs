use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::investease::ProxyRequest;
use crate::state::AppState;

/// ANY /investease/*path - Transparent pass-through to the sandbox
pub async fn proxy(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let request = ProxyRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        content_type: header_str(header::CONTENT_TYPE),
        accept: header_str(header::ACCEPT),
        body,
    };

    let upstream = state.investease().forward(request).await?;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response())
}
