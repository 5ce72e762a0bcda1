use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub store: HealthCheck,
    pub inventory: HealthCheck,
    pub voice: HealthCheck,
    pub checked_at: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Only the hotel store decides readiness; missing provider credentials are reported but
/// the desk still answers from static data.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = match state.hotel.snapshot().await {
        Ok(data) => HealthCheck {
            status: "ready",
            detail: format!("{} rooms, {} bookings", data.rooms.len(), data.bookings.len()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("hotel store unreadable: {error}") }
        }
    };
    let ready = store.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!("{} front desk online", state.config.hotel.name),
        },
        store,
        inventory: configured_check(state.inventory.is_some(), "live room offers"),
        voice: configured_check(state.voice.is_some(), "phone assistant"),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn configured_check(configured: bool, feature: &str) -> HealthCheck {
    if configured {
        HealthCheck { status: "configured", detail: format!("{feature} enabled") }
    } else {
        HealthCheck { status: "unconfigured", detail: format!("{feature} disabled") }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use crate::bootstrap::test_support::demo_state;
    use crate::health::health;

    #[tokio::test]
    async fn health_is_ready_with_static_data_only() {
        let (status, Json(payload)) = health(State(demo_state())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.store.status, "ready");
        assert_eq!(payload.store.detail, "8 rooms, 0 bookings");
        assert_eq!(payload.inventory.status, "unconfigured");
        assert_eq!(payload.voice.status, "unconfigured");
        assert!(payload.service.detail.contains("Hyatt House"));
    }
}
