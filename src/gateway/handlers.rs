use super::signature::{constant_time_eq, verify_whatsapp_signature};
use super::{AppState, WhatsAppVerifyQuery};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};

fn whatsapp_not_configured_response() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "WhatsApp not configured"})),
    )
}

fn invalid_whatsapp_signature_response() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": "Invalid signature"})),
    )
}

fn invalid_whatsapp_payload_response() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "Invalid JSON payload"})),
    )
}

fn whatsapp_ack_response() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "whatsapp": state.whatsapp.is_some(),
    }))
}

/// GET /whatsapp: Meta webhook verification
pub(super) async fn handle_whatsapp_verify(
    State(state): State<AppState>,
    Query(params): Query<WhatsAppVerifyQuery>,
) -> impl IntoResponse {
    let Some(ref wa) = state.whatsapp else {
        return (StatusCode::NOT_FOUND, "WhatsApp not configured".to_string());
    };

    let token_matches = params
        .verify_token
        .as_deref()
        .is_some_and(|t| constant_time_eq(t, wa.verify_token()));
    if params.mode.as_deref() == Some("subscribe") && token_matches {
        if let Some(ch) = params.challenge {
            tracing::info!("WhatsApp webhook verified");
            return (StatusCode::OK, ch);
        }
        return (StatusCode::BAD_REQUEST, "Missing hub.challenge".to_string());
    }

    tracing::warn!("WhatsApp webhook verification failed: token mismatch");
    (StatusCode::FORBIDDEN, "Forbidden".to_string())
}

/// POST /whatsapp: inbound messages
///
/// Acknowledges as soon as the payload is parsed; each message is relayed in
/// a task of its own.
pub(super) async fn handle_whatsapp_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let (Some(wa), Some(listener)) = (&state.whatsapp, &state.listener) else {
        return whatsapp_not_configured_response();
    };

    if let Some(ref app_secret) = state.whatsapp_app_secret {
        let signature = headers
            .get("X-Hub-Signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !verify_whatsapp_signature(app_secret, &body, signature) {
            tracing::warn!(
                signature = if signature.is_empty() { "missing" } else { "invalid" },
                "WhatsApp webhook signature verification failed"
            );
            return invalid_whatsapp_signature_response();
        }
    }

    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return invalid_whatsapp_payload_response();
    };

    for message in wa.parse_webhook_payload(&payload) {
        tracing::debug!(chat = %message.chat_id, id = %message.id, "WhatsApp message received");
        let listener = listener.clone();
        tokio::spawn(async move {
            listener.handle(&message).await;
        });
    }

    whatsapp_ack_response()
}
