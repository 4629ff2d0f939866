//! Main gateway implementation
//!
//! Wires the poller, the pin cache, the log gate and the web surface around
//! one shared `GatewayState`, and owns the run/shutdown sequence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use shared::{Component, component_info, logging};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::GatewayConfig;
use crate::core::{LogGate, LogPolicy, PinCache, SensorPoller};
use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;
use crate::traits::{Broadcaster, LogSink, PinDriver, SensorSource};
use crate::web::{self, WebContext};

/// Handle for requesting a graceful stop from another task
#[derive(Clone)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

/// Main gateway struct with dependency injection
pub struct Gateway<S, B>
where
    S: SensorSource,
    B: Broadcaster,
{
    state: Arc<GatewayState>,
    poller: Arc<SensorPoller<S, B>>,
    broadcaster: Arc<B>,
    bind_address: SocketAddr,
    static_file: PathBuf,
    shutdown: Arc<watch::Sender<bool>>,
}

impl<S, B> Gateway<S, B>
where
    S: SensorSource + 'static,
    B: Broadcaster + 'static,
{
    /// Create a new gateway. Remote logging is enabled only when `log_sink` is given.
    pub fn new(
        config: &GatewayConfig,
        source: S,
        broadcaster: B,
        pin_driver: Arc<dyn PinDriver>,
        log_sink: Option<Arc<dyn LogSink>>,
    ) -> Self {
        let log_gate = log_sink.map(|sink| LogGate::new(LogPolicy::from_config(config), sink));
        let state = Arc::new(GatewayState::new(PinCache::new(pin_driver), log_gate));
        let broadcaster = Arc::new(broadcaster);

        let poller = Arc::new(SensorPoller::new(
            source,
            broadcaster.clone(),
            state.clone(),
            config.poll_interval,
            config.fetch_timeout,
        ));

        let (shutdown, _) = watch::channel(false);

        Self {
            state,
            poller,
            broadcaster,
            bind_address: config.bind_address,
            static_file: config.static_file.clone(),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            sender: self.shutdown.clone(),
        }
    }

    /// Build the axum router with all routes
    pub fn build_router(&self) -> Router {
        let context = WebContext {
            state: self.state.clone(),
            broadcaster: self.broadcaster.clone(),
        };
        web::build_router(context, &self.static_file)
    }

    /// Bind the configured address and run until shutdown
    pub async fn run(&self) -> GatewayResult<()> {
        let listener = TcpListener::bind(self.bind_address)
            .await
            .map_err(|e| GatewayError::ServerStartup(format!("Failed to bind to {}: {}", self.bind_address, e)))?;

        self.serve(listener).await
    }

    /// Run the poller and the HTTP server on `listener` until shutdown,
    /// then release every pin handle
    pub async fn serve(&self, listener: TcpListener) -> GatewayResult<()> {
        let local_addr = listener.local_addr()?;
        logging::log_startup(Component::Gateway, &format!("gateway on http://{local_addr}"));

        let poll_task = {
            let poller = self.poller.clone();
            let shutdown = self.shutdown.subscribe();
            tokio::spawn(async move { poller.run(shutdown).await })
        };

        let mut server_shutdown = self.shutdown.subscribe();
        let served = axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                // Also resolves if the sender is dropped
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .await;

        // Stop polling even when the server exited on its own
        self.shutdown.send_replace(true);
        if let Err(e) = poll_task.await {
            logging::log_error(Component::Poller, "Poll task", &e);
        }

        self.teardown().await;

        served.map_err(|e| GatewayError::ServerStartup(format!("HTTP server error: {e}")))
    }

    async fn teardown(&self) {
        self.state.set_running(false);
        let released = self.state.pin_cache.release_all().await;
        component_info!(Component::Gateway, "Teardown complete ({} pin handle(s) released)", released);
    }
}
