//! HTTP and WebSocket surface
//!
//! Routes:
//! - `GET /`            the dashboard page
//! - `GET /ws`          subscriber WebSocket
//! - `POST /api/gpio`   pin write
//! - `GET /api/sensors` last known reading
//! - `GET /api/status`  gateway counters
//! - `GET /health`      liveness

pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;

use crate::state::GatewayState;
use crate::traits::Broadcaster;

/// Shared handler context
pub struct WebContext<B>
where
    B: Broadcaster,
{
    pub state: Arc<GatewayState>,
    pub broadcaster: Arc<B>,
}

impl<B> Clone for WebContext<B>
where
    B: Broadcaster,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            broadcaster: self.broadcaster.clone(),
        }
    }
}

/// Build the axum router with all routes
pub fn build_router<B>(context: WebContext<B>, static_file: &Path) -> Router
where
    B: Broadcaster + 'static,
{
    Router::new()
        .route_service("/", ServeFile::new(static_file))
        .route("/ws", get(handlers::websocket::websocket_handler::<B>))
        .route("/api/gpio", post(handlers::api::gpio_handler::<B>))
        .route("/api/sensors", get(handlers::api::latest_reading_handler::<B>))
        .route("/api/status", get(handlers::api::status_handler::<B>))
        .route("/health", get(handlers::api::health_check::<B>))
        .layer(
            ServiceBuilder::new()
                // Control clients connect from arbitrary origins
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(context)
}
