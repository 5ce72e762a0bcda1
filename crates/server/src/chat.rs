use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use frontdesk_core::domain::hotel::HotelData;
use frontdesk_core::errors::ApplicationError;

use crate::bootstrap::AppState;
use crate::response::{application_failure, failure, ApiError, ApiResult};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub use_llm: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/greeting", get(greeting))
        .route("/api/chat", post(chat))
        .route("/api/rooms", get(rooms))
        .route("/api/bookings", get(bookings))
        .route("/api/amenities", get(amenities))
        .route("/api/policies", get(policies))
        .route("/api/faqs", get(faqs))
}

pub async fn greeting(State(state): State<AppState>) -> ApiResult {
    Ok(Json(json!({"success": true, "message": state.runtime.greeting()})))
}

/// A request without a session id starts a new conversation under a generated id.
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> ApiResult {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Message is required"));
    }
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let reply = state
        .runtime
        .handle_message(&session_id, message, request.use_llm)
        .await
        .map_err(|error| application_failure(error, "chat"))?;

    Ok(Json(json!({
        "success": true,
        "message": reply.message,
        "session_id": reply.session_id,
    })))
}

pub async fn rooms(State(state): State<AppState>) -> ApiResult {
    let rooms = state
        .hotel
        .rooms()
        .await
        .map_err(|error| application_failure(ApplicationError::from(error), "rooms"))?;
    Ok(Json(json!({"success": true, "rooms": rooms})))
}

pub async fn bookings(State(state): State<AppState>) -> ApiResult {
    let bookings = state
        .hotel
        .bookings()
        .await
        .map_err(|error| application_failure(ApplicationError::from(error), "bookings"))?;
    Ok(Json(json!({"success": true, "bookings": bookings})))
}

pub async fn amenities(State(state): State<AppState>) -> ApiResult {
    let data = snapshot(&state, "amenities").await?;
    Ok(Json(json!({"success": true, "amenities": data.amenities})))
}

pub async fn policies(State(state): State<AppState>) -> ApiResult {
    let data = snapshot(&state, "policies").await?;
    Ok(Json(json!({"success": true, "policies": data.policies})))
}

pub async fn faqs(State(state): State<AppState>) -> ApiResult {
    let data = snapshot(&state, "faqs").await?;
    Ok(Json(json!({"success": true, "faqs": data.faqs})))
}

async fn snapshot(state: &AppState, operation: &'static str) -> Result<HotelData, ApiError> {
    state
        .hotel
        .snapshot()
        .await
        .map_err(|error| application_failure(ApplicationError::from(error), operation))
}
