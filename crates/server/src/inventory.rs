use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use frontdesk_core::inventory::AvailabilityQuery;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub guests: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory/search", post(search))
        .route("/api/inventory/status", get(status))
}

/// Always answers 200; `using_static` tells the page to keep showing the local rooms.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<Value> {
    let provider = state.runtime.desk().inventory().clone();
    if !provider.is_configured() {
        return Json(json!({
            "success": false,
            "error": "Inventory provider not configured. Using static data.",
            "using_static": true,
        }));
    }

    let Some((check_in, check_out)) = stay_dates(&request, Utc::now().date_naive()) else {
        return Json(json!({
            "success": false,
            "error": "check_in and check_out must be YYYY-MM-DD dates",
            "using_static": true,
        }));
    };
    let query = AvailabilityQuery::new(check_in, check_out, request.guests.unwrap_or(1));

    let result = match (&state.inventory, request.city_code.as_deref()) {
        (Some(client), Some(city_code)) if !city_code.trim().is_empty() => {
            client.property_rooms(city_code.trim(), &query).await
        }
        _ => provider.search_rooms(&query).await,
    };

    match result {
        Ok(rooms) => Json(json!({
            "success": true,
            "rooms": rooms,
            "source": "provider",
            "check_in": check_in,
            "check_out": check_out,
        })),
        Err(error) => {
            warn!(
                event_name = "server.inventory_search_failed",
                error = %error,
                "inventory search failed"
            );
            Json(json!({"success": false, "error": error.to_string(), "using_static": true}))
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let provider = state.runtime.desk().inventory().clone();
    if !provider.is_configured() {
        return Json(json!({
            "configured": false,
            "message": "Inventory API credentials not set. Configure inventory.api_key and \
                        inventory.api_secret.",
        }));
    }

    match provider.check_connection().await {
        Ok(()) => Json(json!({
            "configured": true,
            "authenticated": true,
            "message": "Inventory API ready to use!",
        })),
        Err(error) => Json(json!({
            "configured": true,
            "authenticated": false,
            "error": error.to_string(),
        })),
    }
}

/// Both dates parsed, or tomorrow for one night when either is missing.
fn stay_dates(request: &SearchRequest, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    fn given(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|text| !text.is_empty())
    }
    match (given(&request.check_in), given(&request.check_out)) {
        (Some(check_in), Some(check_out)) => Some((
            NaiveDate::parse_from_str(check_in, "%Y-%m-%d").ok()?,
            NaiveDate::parse_from_str(check_out, "%Y-%m-%d").ok()?,
        )),
        _ => {
            let tomorrow = today.checked_add_days(Days::new(1))?;
            Some((tomorrow, tomorrow.checked_add_days(Days::new(1))?))
        }
    }
}
