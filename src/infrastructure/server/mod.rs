//! HTTP endpoint receiving activities from the channel

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tokio::net::TcpListener;

use crate::domain::entities::Activity;
use crate::application::errors::BotError;
use crate::application::services::TurnService;

pub const MESSAGES_PATH: &str = "/api/messages";

/// Build the router serving the messaging endpoint
pub fn router(turns: Arc<TurnService>) -> Router {
    Router::new()
        .route(MESSAGES_PATH, post(messages))
        .with_state(turns)
}

/// Serve the messaging endpoint until the listener fails
pub async fn serve(listener: TcpListener, turns: Arc<TurnService>) -> Result<(), BotError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}{}", addr, MESSAGES_PATH);
    }
    axum::serve(listener, router(turns))
        .await
        .map_err(|e| BotError::Network(e.to_string()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn status_for(error: &BotError) -> StatusCode {
    match error {
        BotError::Auth(_) => StatusCode::UNAUTHORIZED,
        BotError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        BotError::Parse(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn messages(
    State(turns): State<Arc<TurnService>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !is_json(&headers) {
        tracing::warn!("Rejected request with non-JSON content type");
        return StatusCode::UNSUPPORTED_MEDIA_TYPE;
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = turns.adapter().authenticate(auth_header).await {
        return status_for(&e);
    }

    let activity: Activity = match serde_json::from_slice(&body) {
        Ok(activity) => activity,
        Err(e) => {
            tracing::warn!("Malformed activity payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    match turns.run_turn(activity).await {
        Ok(summary) => {
            tracing::debug!(
                "Turn complete: {} ({} replies)",
                summary.activity_type,
                summary.replies_sent
            );
            StatusCode::OK
        }
        Err(e) => status_for(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn json_content_types_are_accepted() {
        assert!(is_json(&headers("application/json")));
        assert!(is_json(&headers("application/json; charset=utf-8")));
    }

    #[test]
    fn other_content_types_are_rejected() {
        assert!(!is_json(&headers("text/plain")));
        assert!(!is_json(&headers("application/x-www-form-urlencoded")));
        assert!(!is_json(&HeaderMap::new()));
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(status_for(&BotError::Auth("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&BotError::Parse("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&BotError::PermissionDenied("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&BotError::Network("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
