//! Recipe Hub HTTP server.
//!
//! Startup order:
//!
//! 1. Load `.env` and configuration
//! 2. Tracing and the Prometheus exporter
//! 3. Connect to Postgres, run migrations, seed categories
//! 4. Signing key, token service, Chapa client
//! 5. Serve until Ctrl+C or SIGTERM, then drain within `SHUTDOWN_TIMEOUT`

use anyhow::Context;
use recipe_hub_auth::{SigningKey, TokenConfig, TokenService};
use recipe_hub_chapa::ChapaClient;
use recipe_hub_core::SystemClock;
use recipe_hub_postgres::PostgresStore;
use recipe_hub_web::{AppState, Config, build_router, metrics::install_prometheus};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_hub=debug,sqlx=warn,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::from_env();
    info!(
        http = %config.http_addr(),
        metrics_port = config.server.metrics_port,
        upload_dir = %config.upload.dir.display(),
        chapa_api_url = %config.payment.chapa_api_url,
        "Configuration loaded"
    );

    let metrics_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.metrics_port)
        .parse()
        .context("invalid metrics listen address")?;
    install_prometheus(metrics_addr).context("failed to install Prometheus exporter")?;

    let store = PostgresStore::connect_with_timeout(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.connect_timeout),
    )
    .await?;
    store.migrate().await?;
    let seeded = store.seed_default_categories().await?;
    info!(seeded, "Default categories ensured");

    let signing_key = match &config.auth.jwt_secret {
        Some(secret) => SigningKey::new(secret.as_bytes())?,
        None => {
            warn!("JWT_SECRET not set; generated a random signing key, sessions will not survive a restart");
            SigningKey::generate()
        }
    };
    let tokens = TokenService::new(
        &signing_key,
        TokenConfig::new().with_ttl(chrono::Duration::hours(config.auth.token_ttl_hours)),
        Arc::new(SystemClock),
    );

    let secret_key = config.payment.chapa_secret_key.clone().unwrap_or_else(|| {
        warn!("CHAPA_SECRET_KEY not set; payment initialization will be rejected by the provider");
        String::new()
    });
    let gateway = ChapaClient::new(
        secret_key,
        config.payment.chapa_api_url.clone(),
        config.payment.timeout(),
    )?;

    let addr = config.http_addr();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let state = AppState::new(store, tokens, Arc::new(gateway), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => result.context("server error")?,
        () = async {
            let _ = shutdown_rx.changed().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(timeout_secs = shutdown_timeout.as_secs(), "Graceful shutdown timed out, dropping open connections");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM signal, shutting down gracefully..."),
    }
}
