use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use waypoint_auth::{BearerGate, IdentityProvider, KeySet, SessionGate};
use waypoint_gateway::cli::{AuthConfig, Cli, GatewayConfig};
use waypoint_gateway::telemetry::init_tracing;
use waypoint_gateway::{App, AppState};
use waypoint_registry::RegistryService;
use waypoint_storage::PostgresRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.log_format);

    let auth_mode = cli.auth;
    let config = GatewayConfig::try_from(cli)?;

    info!(
        listen_addr = %config.listen_addr,
        auth = %auth_mode,
        "starting waypoint gateway"
    );

    let repository = PostgresRepository::connect(&config.database_url)
        .await
        .context("cannot connect to postgres")?;
    repository
        .migrate()
        .await
        .context("cannot apply database migrations")?;
    let registry = Arc::new(RegistryService::new(repository));

    let router = match config.auth {
        AuthConfig::Session { provider, base_url } => {
            let secure_cookie = base_url.starts_with("https://");
            let gate = Arc::new(SessionGate::new(IdentityProvider::new(provider), base_url));
            let state = AppState::new(registry, gate.clone());
            App::session_router(state, gate, secure_cookie)
        }
        AuthConfig::Bearer {
            jwks_url,
            refresh,
            gate,
        } => {
            let keys = KeySet::load(&jwks_url)
                .await
                .with_context(|| format!("cannot load key set from {jwks_url}"))?;
            keys.spawn_refresh(refresh);
            let gate = Arc::new(BearerGate::new(keys, gate));
            App::router(AppState::new(registry, gate))
        }
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
