use std::{process::ExitCode, sync::Arc};

use chcemvediet_server::{
    api::{AppState, new_router},
    auth::oauth::{OAuth2Provider, Providers},
    config::Config,
    db::{clients::sqlite::SqliteClient, interface::DatabaseClient},
    jobs,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let db: Arc<dyn DatabaseClient> = match SqliteClient::open(&config.database_url).await {
        Ok(db) => Arc::new(db),
        Err(err) => {
            error!("failed to open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut providers = Providers::new();
    for credentials in &config.providers {
        match OAuth2Provider::new(
            credentials.provider,
            credentials.client_id.clone(),
            credentials.client_secret.0.clone(),
        ) {
            Ok(provider) => providers = providers.with(provider),
            Err(err) => {
                error!("failed to set up {} login: {err}", credentials.provider);
                return ExitCode::FAILURE;
            }
        }
    }
    if providers.enabled().is_empty() {
        warn!("no identity providers configured; only password login is available");
    } else {
        info!(?providers, "identity providers enabled");
    }

    if !config.static_dir.is_dir() {
        warn!(
            "static directory {} does not exist",
            config.static_dir.display()
        );
    }

    tokio::spawn(jobs::run_periodically(Arc::clone(&db)));

    let state = AppState::new(db, providers, &config);
    let router = new_router(state, &config.static_dir);

    let listener = match TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("failed to listen on {}: {err}", config.listen_addr);
            return ExitCode::FAILURE;
        }
    };
    info!("serving {} on {}", config.app_url, config.listen_addr);
    if let Err(err) = axum::serve(listener, router).await {
        error!("failed to start server: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
