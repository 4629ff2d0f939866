//! JSON API handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use shared::{Component, component_warn};

use crate::core::{PinCommand, apply_command};
use crate::traits::Broadcaster;
use crate::types::ControlRequest;
use crate::web::WebContext;

/// `POST /api/gpio`
///
/// Malformed input is rejected with 400 before the pin cache is touched.
/// Valid input always gets 202; actuator failures stay in the local log.
pub async fn gpio_handler<B>(
    State(context): State<WebContext<B>>,
    payload: Result<Json<ControlRequest>, JsonRejection>,
) -> Response
where
    B: Broadcaster + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            component_warn!(Component::Control, "Rejected control request body: {}", rejection);
            return bad_request(rejection.body_text());
        }
    };

    let command = match PinCommand::try_from(request) {
        Ok(command) => command,
        Err(e) => {
            component_warn!(Component::Control, "Rejected control request {:?}: {}", request, e);
            return bad_request(e.to_string());
        }
    };

    apply_command(&context.state.pin_cache, command).await;

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "accepted",
            "pin": command.pin,
            "value": command.level,
        })),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": "rejected",
            "message": message,
        })),
    )
        .into_response()
}

/// `GET /api/sensors`
pub async fn latest_reading_handler<B>(State(context): State<WebContext<B>>) -> Response
where
    B: Broadcaster + 'static,
{
    match context.state.last_reading().await {
        Some(latest) => Json(latest).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "no_data", "message": "No reading received yet" })),
        )
            .into_response(),
    }
}

/// `GET /api/status`
pub async fn status_handler<B>(State(context): State<WebContext<B>>) -> Json<serde_json::Value>
where
    B: Broadcaster + 'static,
{
    let state = &context.state;

    let log_gate = match &state.log_gate {
        Some(gate) => {
            let throttle = gate.snapshot().await;
            json!({
                "enabled": true,
                "stats": gate.stats(),
                "last_source_timestamp": throttle.last_source_timestamp,
                "last_angle_x_deg": throttle.last_angle_x_deg,
                "last_angle_y_deg": throttle.last_angle_y_deg,
            })
        }
        None => json!({ "enabled": false }),
    };

    let last_reading_at = state.last_reading().await.map(|latest| latest.received_at);

    Json(json!({
        "status": if state.is_running() { "running" } else { "stopping" },
        "uptime_seconds": state.uptime_seconds(),
        "subscribers": context.broadcaster.subscriber_count().await,
        "cached_pins": state.pin_cache.cached_pins().await,
        "ticks": state.tick_stats(),
        "last_reading_at": last_reading_at,
        "log_gate": log_gate,
    }))
}

/// `GET /health`
pub async fn health_check<B>(State(context): State<WebContext<B>>) -> Json<serde_json::Value>
where
    B: Broadcaster + 'static,
{
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "uptime": context.state.uptime_seconds(),
    }))
}
