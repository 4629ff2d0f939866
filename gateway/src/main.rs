//! Gateway process entry point
//!
//! Every option can be given as a flag or through the environment (a `.env`
//! file in the working directory is loaded first).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use shared::{Component, logging};
use tokio::signal;

use gateway::{
    Gateway, GatewayConfig, HttpLogSink, HttpSensorSource, LogSink, RealBroadcaster, SimulatedPinDriver,
    config::{self, LogSinkConfig},
};

#[derive(Parser, Debug)]
#[command(name = "gateway")]
#[command(about = "Bridges a local sensor service to WebSocket clients and drives output pins")]
struct Args {
    /// Port for the HTTP/WebSocket server
    #[arg(long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    bind_host: IpAddr,

    /// Upstream sensor endpoint
    #[arg(long, env = "SENSOR_URL", default_value = config::DEFAULT_SENSOR_URL)]
    sensor_url: String,

    /// Poll period in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = config::DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Upstream fetch timeout in milliseconds (default: 80% of the poll period)
    #[arg(long, env = "FETCH_TIMEOUT_MS")]
    fetch_timeout_ms: Option<u64>,

    /// Remote log endpoint; remote logging is off when unset
    #[arg(long, env = "LOG_ENDPOINT")]
    log_endpoint: Option<String>,

    /// Auth token sent with every log record
    #[arg(long, env = "LOG_AUTH_TOKEN", hide_env_values = true)]
    log_token: Option<String>,

    /// Minimum time between logged readings when angles are steady
    #[arg(long, env = "LOG_INTERVAL_MS", default_value_t = config::DEFAULT_LOG_INTERVAL_MS)]
    log_interval_ms: u64,

    /// Angle change in degrees that triggers a log record early
    #[arg(long, env = "ANGLE_THRESHOLD_DEG", default_value_t = config::DEFAULT_ANGLE_THRESHOLD_DEG)]
    angle_threshold_deg: f64,

    /// Reject sensor readings that carry no timestamp
    #[arg(long, env = "REQUIRE_SOURCE_TIMESTAMP")]
    require_source_timestamp: bool,

    /// Dashboard page served at `/`
    #[arg(long, env = "STATIC_FILE", default_value = "./static/index.html")]
    static_file: PathBuf,

    /// Highest output line the pin driver accepts
    #[arg(long, env = "MAX_PIN", default_value_t = config::DEFAULT_MAX_PIN)]
    max_pin: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> gateway::GatewayResult<GatewayConfig> {
        let poll_interval = Duration::from_millis(self.poll_interval_ms);
        let fetch_timeout = self
            .fetch_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config::default_fetch_timeout(poll_interval));

        let log_sink = match (self.log_endpoint, self.log_token) {
            (Some(endpoint), Some(token)) => Some(LogSinkConfig { endpoint, token }),
            (Some(endpoint), None) => Some(LogSinkConfig {
                endpoint,
                token: String::new(),
            }),
            (None, _) => None,
        };

        GatewayConfig {
            bind_address: SocketAddr::new(self.bind_host, self.port),
            sensor_url: self.sensor_url,
            poll_interval,
            fetch_timeout,
            log_sink,
            log_interval: Duration::from_millis(self.log_interval_ms),
            angle_threshold_deg: self.angle_threshold_deg,
            require_source_timestamp: self.require_source_timestamp,
            static_file: self.static_file,
            max_pin: self.max_pin,
        }
        .validate()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));

    let config = args.into_config().context("invalid gateway configuration")?;

    let source = HttpSensorSource::new(&config.sensor_url, config.fetch_timeout, config.require_source_timestamp)?;
    let pin_driver = Arc::new(SimulatedPinDriver::new(config.max_pin));
    let log_sink = match &config.log_sink {
        Some(sink) => {
            let sink = HttpLogSink::new(&sink.endpoint, &sink.token, config.log_interval)?;
            Some(Arc::new(sink) as Arc<dyn LogSink>)
        }
        None => None,
    };

    match &config.log_sink {
        Some(sink) => logging::log_success(Component::Gateway, &format!("Remote logging to {}", sink.endpoint)),
        None => logging::log_success(Component::Gateway, "Remote logging disabled (no LOG_ENDPOINT)"),
    }

    let gateway = Gateway::new(&config, source, RealBroadcaster::new(), pin_driver, log_sink);

    let shutdown = gateway.shutdown_handle();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown(Component::Gateway, "Received Ctrl+C signal");
                shutdown.trigger();
            }
            Err(err) => {
                logging::log_error(Component::Gateway, "Signal handling", &err);
            }
        }
    });

    gateway.run().await?;

    logging::log_success(Component::Gateway, "Gateway stopped gracefully");
    Ok(())
}
