use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use frontdesk_core::domain::session::{CallDirection, CallSession, CallStatus};
use frontdesk_core::errors::ApplicationError;
use frontdesk_voice::{
    parse_webhook, CallPurpose, OutboundCall, VoiceClient, VoiceError, WebhookEvent,
};

use crate::bootstrap::AppState;
use crate::response::{application_failure, failure, ApiError, ApiResult};

const SECRET_HEADER: &str = "x-vapi-secret";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InboundCallRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutboundCallRequest {
    #[serde(default)]
    pub to_number: Option<String>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EndCallRequest {
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/voice/public-key", get(public_key))
        .route("/api/voice/web-call-config", get(web_call_config))
        .route("/api/voice/setup-assistant", post(setup_assistant))
        .route("/api/voice/call/inbound", post(inbound_call))
        .route("/api/voice/call/outbound", post(outbound_call))
        .route("/api/voice/call/status/{call_id}", get(call_status))
        .route("/api/voice/call/end", post(end_call))
        .route("/api/voice/sessions", get(sessions))
        .route("/api/voice/webhook", post(webhook))
}

pub async fn public_key(State(state): State<AppState>) -> Json<Value> {
    match &state.voice {
        Some(voice) => Json(json!({"configured": true, "public_key": voice.public_key()})),
        None => Json(json!({"configured": false, "public_key": null})),
    }
}

/// Creates the assistant on first use so the browser SDK always gets a working config.
pub async fn web_call_config(State(state): State<AppState>) -> ApiResult {
    let voice = configured(&state)?;
    if voice.assistant_id().await.is_none() {
        let definition = state.assistant.assistant_definition(Some(&webhook_url(&state)));
        voice.create_assistant(&definition).await.map_err(voice_failure)?;
    }
    Ok(Json(state.assistant.web_call_config(&webhook_url(&state))))
}

pub async fn setup_assistant(State(state): State<AppState>) -> ApiResult {
    let voice = configured(&state)?;
    let definition = state.assistant.assistant_definition(Some(&webhook_url(&state)));
    let assistant_id = voice.create_assistant(&definition).await.map_err(voice_failure)?;
    Ok(Json(json!({
        "success": true,
        "assistant_id": assistant_id,
        "message": "Voice assistant created successfully",
    })))
}

pub async fn inbound_call(
    State(state): State<AppState>,
    Json(request): Json<InboundCallRequest>,
) -> ApiResult {
    let Some(phone_number) = non_empty(request.phone_number) else {
        return Err(failure(StatusCode::BAD_REQUEST, "phone_number is required"));
    };
    let voice = configured(&state)?;

    let call_id = voice
        .start_inbound_call(&phone_number, request.metadata.unwrap_or_default())
        .await
        .map_err(voice_failure)?;

    let session = CallSession::new(
        Uuid::new_v4().to_string(),
        Some(call_id.clone()),
        phone_number.clone(),
        CallDirection::Inbound,
        Utc::now(),
    );
    let session_id = save_call(&state, session).await?;

    Ok(Json(json!({
        "success": true,
        "call_id": call_id,
        "session_id": session_id,
        "message": format!("Call initiated to {phone_number}"),
    })))
}

pub async fn outbound_call(
    State(state): State<AppState>,
    Json(request): Json<OutboundCallRequest>,
) -> ApiResult {
    let Some(to_number) = non_empty(request.to_number) else {
        return Err(failure(StatusCode::BAD_REQUEST, "to_number is required"));
    };
    let voice = configured(&state)?;
    let guest_name = non_empty(request.guest_name);
    let purpose = CallPurpose::parse(request.purpose.as_deref().unwrap_or_default());

    let call_id = voice
        .start_outbound_call(OutboundCall {
            to_number: to_number.clone(),
            guest_name: guest_name.clone(),
            purpose: purpose.as_str().to_owned(),
            first_message: state.assistant.outbound_first_message(purpose, guest_name.as_deref()),
            metadata: request.metadata.unwrap_or_default(),
        })
        .await
        .map_err(voice_failure)?;

    let callee = guest_name.clone().unwrap_or_else(|| to_number.clone());
    let session = CallSession::new(
        Uuid::new_v4().to_string(),
        Some(call_id.clone()),
        to_number,
        CallDirection::Outbound,
        Utc::now(),
    )
    .with_guest(guest_name, Some(purpose.as_str().to_owned()));
    let session_id = save_call(&state, session).await?;

    Ok(Json(json!({
        "success": true,
        "call_id": call_id,
        "session_id": session_id,
        "message": format!("Calling {callee}..."),
    })))
}

pub async fn call_status(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> ApiResult {
    let voice = configured(&state)?;
    let status = voice.call_status(&call_id).await.map_err(voice_failure)?;
    Ok(Json(json!({"success": true, "call_status": status})))
}

/// Accepts either the platform call id or our session id.
pub async fn end_call(
    State(state): State<AppState>,
    Json(request): Json<EndCallRequest>,
) -> ApiResult {
    let mut session = match non_empty(request.session_id) {
        Some(session_id) => state.calls.find(&session_id).await.map_err(call_store_failure)?,
        None => None,
    };
    let call_id =
        non_empty(request.call_id).or_else(|| session.as_ref().and_then(|s| s.call_id.clone()));
    let Some(call_id) = call_id else {
        return Err(failure(StatusCode::BAD_REQUEST, "call_id or session_id required"));
    };
    let voice = configured(&state)?;

    let ended = voice.end_call(&call_id).await.map_err(voice_failure)?;
    if session.is_none() {
        session = state.calls.find_by_call_id(&call_id).await.map_err(call_store_failure)?;
    }
    if let Some(mut session) = session {
        session.end(Utc::now(), None);
        state.calls.save(session).await.map_err(call_store_failure)?;
    }

    Ok(Json(json!({
        "success": ended,
        "message": if ended { "Call ended" } else { "Failed to end call" },
    })))
}

pub async fn sessions(State(state): State<AppState>) -> ApiResult {
    let sessions = state.calls.list().await.map_err(call_store_failure)?;
    Ok(Json(json!({"success": true, "sessions": sessions})))
}

/// Function calls are answered inline; lifecycle events update the matching call session.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> ApiResult {
    if let Some(secret) = &state.config.voice.webhook_secret {
        let presented = headers.get(SECRET_HEADER).and_then(|value| value.to_str().ok());
        if presented != Some(secret.expose_secret()) {
            warn!(event_name = "voice.webhook_rejected", "webhook secret mismatch");
            return Err(failure(StatusCode::UNAUTHORIZED, "invalid webhook secret"));
        }
    }

    let event = parse_webhook(&payload);
    info!(
        event_name = "voice.webhook_received",
        call_id = event.call_id().unwrap_or("unknown"),
        "voice webhook received"
    );

    match event {
        WebhookEvent::FunctionCall { name, arguments, .. } => {
            match state.tools.execute(&name, Value::Object(arguments)).await {
                Ok(result) => Ok(Json(json!({"success": true, "result": result}))),
                Err(error) => {
                    warn!(
                        event_name = "voice.function_failed",
                        function = %name,
                        error = %error,
                        "voice function failed"
                    );
                    Ok(Json(json!({
                        "available": false,
                        "message": format!("Sorry, I encountered an error: {error}"),
                    })))
                }
            }
        }
        WebhookEvent::CallStarted { call_id: Some(call_id) } => {
            if let Some(mut session) =
                state.calls.find_by_call_id(&call_id).await.map_err(call_store_failure)?
            {
                session.status = CallStatus::Active;
                state.calls.save(session).await.map_err(call_store_failure)?;
            }
            Ok(Json(json!({"success": true, "received": true})))
        }
        WebhookEvent::CallEnded { call_id: Some(call_id), summary } => {
            if let Some(mut session) =
                state.calls.find_by_call_id(&call_id).await.map_err(call_store_failure)?
            {
                session.end(Utc::now(), Some(summary));
                state.calls.save(session).await.map_err(call_store_failure)?;
            }
            Ok(Json(json!({"success": true, "received": true})))
        }
        _ => Ok(Json(json!({"success": true, "received": true}))),
    }
}

fn configured(state: &AppState) -> Result<Arc<VoiceClient>, ApiError> {
    state.voice.clone().ok_or_else(|| {
        failure(StatusCode::BAD_REQUEST, "Voice platform not configured. Set voice.api_key.")
    })
}

fn webhook_url(state: &AppState) -> String {
    format!("{}/api/voice/webhook", state.config.server.base_url())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|raw| raw.trim().to_owned()).filter(|raw| !raw.is_empty())
}

async fn save_call(state: &AppState, session: CallSession) -> Result<String, ApiError> {
    let session_id = session.id.clone();
    info!(
        event_name = "voice.call_started",
        session_id = %session_id,
        direction = ?session.direction,
        "call session opened"
    );
    state.calls.save(session).await.map_err(call_store_failure)?;
    Ok(session_id)
}

fn voice_failure(error: VoiceError) -> ApiError {
    match error {
        VoiceError::NotConfigured(_) => failure(StatusCode::BAD_REQUEST, error),
        other => {
            warn!(
                event_name = "voice.request_failed",
                error = %other,
                "voice platform call failed"
            );
            failure(StatusCode::INTERNAL_SERVER_ERROR, other)
        }
    }
}

fn call_store_failure(error: frontdesk_db::RepositoryError) -> ApiError {
    application_failure(ApplicationError::from(error), "call_sessions")
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::extract::State;
    use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
    use axum::Json;
    use frontdesk_core::config::AppConfig;
    use frontdesk_core::domain::session::CallStatus;
    use frontdesk_voice::VoiceClient;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{end_call, inbound_call, webhook, EndCallRequest, InboundCallRequest};
    use crate::bootstrap::test_support::{demo_state, state_with_voice};
    use crate::bootstrap::{router, AppState};

    async fn post_webhook(state: &AppState, payload: Value) -> Value {
        let Json(reply) =
            webhook(State(state.clone()), HeaderMap::new(), Json(payload)).await.expect("reply");
        reply
    }

    fn voice_state(server: &MockServer) -> AppState {
        let mut config = AppConfig::default();
        config.voice.api_key = Some(SecretString::from("vapi-test".to_owned()));
        config.voice.assistant_id = Some("asst-1".to_owned());
        config.voice.phone_number_id = Some("phone-1".to_owned());
        config.voice.base_url = server.uri();
        let client = VoiceClient::from_config(&config.voice).expect("voice client");
        state_with_voice(config, Some(client))
    }

    #[tokio::test]
    async fn function_calls_run_the_matching_tool() {
        let state = demo_state();

        let reply = post_webhook(
            &state,
            json!({
                "type": "function-call",
                "call": {"id": "call-9"},
                "function": {
                    "name": "check_room_availability",
                    "parameters": {"check_in": "2026-11-02", "check_out": "2026-11-04"}
                }
            }),
        )
        .await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["result"]["available"], true);
        assert_eq!(reply["result"]["rooms"].as_array().map(Vec::len), Some(3));

        let unknown = post_webhook(
            &state,
            json!({"message": {"toolCalls": [
                {"function": {"name": "order_pizza", "arguments": "{}"}}
            ]}}),
        )
        .await;
        assert_eq!(
            unknown["result"],
            json!({"success": false, "message": "Function not recognized"})
        );
    }

    #[tokio::test]
    async fn webhook_secret_must_match_when_configured() {
        let mut config = AppConfig::default();
        config.voice.webhook_secret = Some(SecretString::from("s3cret".to_owned()));
        let state = state_with_voice(config, None);
        let payload = json!({"type": "call-started", "call": {"id": "call-1"}});

        let rejected = webhook(State(state.clone()), HeaderMap::new(), Json(payload.clone()))
            .await
            .expect_err("missing secret");
        assert_eq!(rejected.0, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert("x-vapi-secret", HeaderValue::from_static("s3cret"));
        let accepted = webhook(State(state), headers, Json(payload)).await.expect("accepted");
        assert_eq!(accepted.0["received"], true);
    }

    #[tokio::test]
    async fn call_endpoints_need_a_number_and_a_configured_platform() {
        let state = demo_state();

        let missing = inbound_call(State(state.clone()), Json(InboundCallRequest::default()))
            .await
            .expect_err("missing number");
        assert_eq!(missing.0, StatusCode::BAD_REQUEST);
        assert_eq!(missing.1 .0["error"], "phone_number is required");

        let unconfigured = inbound_call(
            State(state.clone()),
            Json(InboundCallRequest {
                phone_number: Some("+17045550188".to_owned()),
                metadata: None,
            }),
        )
        .await
        .expect_err("no voice client");
        assert_eq!(unconfigured.0, StatusCode::BAD_REQUEST);

        let no_ids = end_call(State(state.clone()), Json(EndCallRequest::default()))
            .await
            .expect_err("no ids");
        assert_eq!(no_ids.1 .0["error"], "call_id or session_id required");

        let response = router(state)
            .oneshot(Request::get("/api/voice/public-key").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload, json!({"configured": false, "public_key": null}));
    }

    #[tokio::test]
    async fn inbound_call_is_tracked_until_the_platform_reports_its_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "call-123"})))
            .expect(1)
            .mount(&server)
            .await;
        let state = voice_state(&server);

        let Json(started) = inbound_call(
            State(state.clone()),
            Json(InboundCallRequest {
                phone_number: Some("+17045550188".to_owned()),
                metadata: None,
            }),
        )
        .await
        .expect("call started");
        assert_eq!(started["call_id"], "call-123");
        assert_eq!(started["message"], "Call initiated to +17045550188");

        post_webhook(
            &state,
            json!({"message": {
                "type": "call-ended",
                "call": {"id": "call-123"},
                "analysis": {"summary": "Guest asked about parking."}
            }}),
        )
        .await;

        let sessions = state.calls.list().await.expect("sessions");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, CallStatus::Ended);
        assert_eq!(sessions[0].summary.as_deref(), Some("Guest asked about parking."));
    }

    #[tokio::test]
    async fn ending_by_session_id_resolves_the_call_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "call-456"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/call/call-456/end"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let app = router(voice_state(&server));

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/voice/call/outbound")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"to_number": "+17045550100", "guest_name": "Ann Park"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let started: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(started["message"], "Calling Ann Park...");
        let session_id = started["session_id"].as_str().expect("session id").to_owned();

        let response = app
            .oneshot(
                Request::post("/api/voice/call/end")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"session_id": session_id}).to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let ended: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(ended, json!({"success": true, "message": "Call ended"}));
    }
}
