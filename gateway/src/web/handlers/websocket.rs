//! WebSocket connection handler
//!
//! Each connection is a subscriber for sensor readings and may also send
//! `gpio_write` and `ping` requests.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use shared::{Component, component_debug, component_error, component_info, component_warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::handle_control_request;
use crate::services::broadcaster::SUBSCRIBER_QUEUE_DEPTH;
use crate::traits::Broadcaster;
use crate::types::{ClientRequest, ServerMessage};
use crate::web::WebContext;

/// WebSocket upgrade handler
pub async fn websocket_handler<B>(ws: WebSocketUpgrade, State(context): State<WebContext<B>>) -> Response
where
    B: Broadcaster + 'static,
{
    ws.on_upgrade(move |socket| handle_websocket(socket, context))
}

/// Drive one subscriber connection until either side closes it
async fn handle_websocket<B>(socket: WebSocket, context: WebContext<B>)
where
    B: Broadcaster + 'static,
{
    let subscriber_id = Uuid::new_v4();
    component_info!(Component::Gateway, "🔗 New WebSocket connection: {}", subscriber_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(SUBSCRIBER_QUEUE_DEPTH);

    if let Err(e) = context.broadcaster.add_subscriber(subscriber_id, tx).await {
        component_error!(Component::Gateway, "Failed to register subscriber {}: {}", subscriber_id, e);
        return;
    }

    let outgoing_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    component_error!(Component::Gateway, "Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(text)).await {
                component_debug!(Component::Gateway, "Send to {} failed: {}", subscriber_id, e);
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                component_warn!(Component::Gateway, "WebSocket error for {}: {}", subscriber_id, e);
                break;
            }
        };

        match frame {
            Message::Text(text) => handle_text(subscriber_id, &text, &context).await,
            Message::Binary(_) => {
                component_warn!(Component::Gateway, "Binary frame from {} ignored", subscriber_id);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    outgoing_task.abort();

    if let Err(e) = context.broadcaster.remove_subscriber(subscriber_id).await {
        component_error!(Component::Gateway, "Failed to remove subscriber {}: {}", subscriber_id, e);
    }

    component_info!(Component::Gateway, "👋 WebSocket connection closed: {}", subscriber_id);
}

async fn handle_text<B>(subscriber_id: Uuid, text: &str, context: &WebContext<B>)
where
    B: Broadcaster,
{
    let request = match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            component_warn!(Component::Control, "Unparsable request from {}: {}", subscriber_id, e);
            return;
        }
    };

    match request {
        ClientRequest::GpioWrite(control) => {
            // Outcome is logged by the control path; nothing goes back to the client
            handle_control_request(&context.state.pin_cache, control).await;
        }
        ClientRequest::Ping => {
            let pong = ServerMessage::Pong {
                server_time: Utc::now().timestamp() as u64,
            };
            if let Err(e) = context.broadcaster.send_to(subscriber_id, pong).await {
                component_debug!(Component::Gateway, "Pong to {} failed: {}", subscriber_id, e);
            }
        }
    }
}
