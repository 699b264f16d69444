use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hestia_prime::{
    AppState, api,
    config::Config,
    registry::{
        AccountRegistry, DeviceRegistry, MeasurementRegistry, SessionRegistry,
        memory::{
            InMemoryAccountRegistry, InMemoryDeviceRegistry, InMemoryMeasurementRegistry,
            InMemorySessionRegistry,
        },
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "hestia-prime")]
#[command(about = "Hestia Prime")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hestia-prime.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tower_http=info,hestia_prime=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    info!(
        http_addr = %config.server.http_addr,
        pseudonym_min = config.schema.pseudonym_min,
        pseudonym_max = config.schema.pseudonym_max,
        "Starting server"
    );

    info!("Using in-memory registries");
    let devices = InMemoryDeviceRegistry::new();
    for device_type in config.device_types {
        let registered = devices.register_type(device_type).await?;
        info!(
            name = %registered.name,
            properties = registered.properties.len(),
            "device type registered"
        );
    }

    let state = AppState {
        accounts: InMemoryAccountRegistry::new(),
        devices,
        sessions: InMemorySessionRegistry::new(),
        measurements: InMemoryMeasurementRegistry::new(),
        limits: config.schema,
        activation_url_base: Arc::from(config.account.activation_url_base),
    };

    run_server(state, config.server.http_addr).await
}

async fn run_server<A, D, S, M>(
    state: AppState<A, D, S, M>,
    http_addr: SocketAddr,
) -> color_eyre::Result<()>
where
    A: AccountRegistry,
    D: DeviceRegistry,
    S: SessionRegistry,
    M: MeasurementRegistry,
{
    let cancel = CancellationToken::new();

    let axum_app = api::router().with_state(state);

    let axum_listener = TcpListener::bind(http_addr).await?;
    info!(%http_addr, "HTTP server listening");

    let cancel_clone = cancel.clone();
    tokio::select! {
        result = axum::serve(axum_listener, axum_app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        }) => {
            if let Err(e) = result {
                tracing::error!(error = ?e, "HTTP server error");
            }
            info!("HTTP server shut down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    }

    Ok(())
}
