// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use agora_server::{
    api::router,
    auth::AuthConfig,
    config::{ConfigError, LogFormat, ServerConfig, TlsPaths},
    db::Database,
    envelope::{EnvelopeCodec, KeyError},
    events::run_analytics_logger,
    state::AppState,
    store::StoreError,
    telemetry::init_tracing,
};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("envelope key error: {0}")]
    Key(#[from] KeyError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(LogFormat::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Server failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let codec = EnvelopeCodec::from_secret(config.response_secret.as_bytes())?;
    let auth = AuthConfig::new(config.jwt_secret.as_bytes(), config.session_cookie.clone());

    // A bad seed file fails startup.
    let db = Database::new(config.seed_file.clone());
    db.connection().await?;

    let state = AppState::new(db, codec, auth);
    let analytics = tokio::spawn(run_analytics_logger(state.events.subscribe()));
    let app = router(state);

    match &config.tls {
        Some(tls) => serve_tls(app, &config, tls).await?,
        None => serve_plain(app, &config).await?,
    }

    analytics.abort();
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

async fn serve_plain(app: Router, config: &ServerConfig) -> Result<(), StartupError> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Agora server listening on http (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn serve_tls(app: Router, config: &ServerConfig, tls: &TlsPaths) -> Result<(), StartupError> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
    tracing::info!(addr = %config.bind_addr, cert = %tls.cert.display(), "Agora server listening on https (docs at /docs)");

    let server = axum_server::bind_rustls(config.bind_addr, tls_config)
        .serve(app.into_make_service());

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal() => tracing::info!("Shutdown signal received"),
    }
    Ok(())
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}
