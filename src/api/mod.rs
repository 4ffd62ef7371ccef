use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::join_all;
use log::warn;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::nutrition::{Query, Resolver};
use crate::providers::traits::AdviceProvider;
use crate::reply::{self, UNRESOLVED_REPLY};

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<Resolver>,
    advisor: Option<Arc<dyn AdviceProvider>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Text,
    Image,
}

/// Neutral inbound event shape delivered by the messaging transport.
#[derive(Debug, Deserialize, Validate)]
pub struct InboundEvent {
    pub kind: EventKind,
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
    /// Base64-encoded image bytes.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WebhookRequest {
    #[validate]
    pub events: Vec<InboundEvent>,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub replies: Vec<String>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

/// Create and configure the webhook router
pub fn create_api(resolver: Arc<Resolver>, advisor: Option<Arc<dyn AdviceProvider>>) -> Router {
    let state = AppState { resolver, advisor };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/callback", post(callback_handler))
        .route("/healthz", get(health_check))
        .layer(cors)
        .with_state(state)
}

async fn callback_handler(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                status: format!("invalid request: {}", e),
            }),
        )
            .into_response();
    }

    // Events are independent; handle them concurrently like the transport
    // delivers them.
    let replies = join_all(
        request
            .events
            .into_iter()
            .map(|event| dispatch_event(state.clone(), event)),
    )
    .await;

    Json(WebhookResponse { replies }).into_response()
}

// Every failure mode degrades to reply text; the transport never sees an
// error for an individual event.
async fn dispatch_event(state: AppState, event: InboundEvent) -> String {
    match event.kind {
        EventKind::Text => {
            let text = event.text.unwrap_or_default().trim().to_string();
            if text.is_empty() {
                return UNRESOLVED_REPLY.to_string();
            }
            match state.resolver.resolve(Query::Text(text.clone())).await {
                Some(record) => reply::nutrition_reply(&record, state.advisor.as_deref()).await,
                None => reply::chat_reply(&text, state.advisor.as_deref()).await,
            }
        }
        EventKind::Image => {
            let Some(encoded) = event.image else {
                return UNRESOLVED_REPLY.to_string();
            };
            let bytes = match BASE64.decode(encoded.as_bytes()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("undecodable image payload: {}", e);
                    return UNRESOLVED_REPLY.to_string();
                }
            };
            match state.resolver.resolve(Query::Image(bytes)).await {
                Some(record) => reply::nutrition_reply(&record, state.advisor.as_deref()).await,
                None => UNRESOLVED_REPLY.to_string(),
            }
        }
    }
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "ok".to_string(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_event_deserializes() {
        let event: InboundEvent =
            serde_json::from_str(r#"{ "kind": "text", "text": "banana" }"#).unwrap();
        assert_eq!(event.kind, EventKind::Text);
        assert_eq!(event.text.as_deref(), Some("banana"));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn image_event_deserializes() {
        let event: InboundEvent =
            serde_json::from_str(r#"{ "kind": "image", "image": "aGVsbG8=" }"#).unwrap();
        assert_eq!(event.kind, EventKind::Image);
        assert_eq!(event.image.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{ "kind": "video" }"#).is_err());
    }

    #[test]
    fn oversized_text_fails_validation() {
        let request = WebhookRequest {
            events: vec![InboundEvent {
                kind: EventKind::Text,
                text: Some("x".repeat(1001)),
                image: None,
            }],
        };
        assert!(request.validate().is_err());
    }
}
