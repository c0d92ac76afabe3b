use api::{build_router, AppState};
use config::{DashboardConfig, LoggingConfig};
use std::sync::Arc;
use store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = DashboardConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Application cannot start without a valid configuration file.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.store.seed_path {
        match store.load_seed(path).await {
            Ok(count) => tracing::info!(path = %path, documents = count, "seed data loaded"),
            Err(e) => {
                tracing::error!(path = %path, error = %e, "failed to load seed data");
                std::process::exit(1);
            }
        }
    }

    let state = AppState::new(store, &config);
    if let Err(e) = state.spawn_watches().await {
        tracing::error!(error = %e, "failed to start view subscriptions");
        std::process::exit(1);
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(address = %bind_address, error = %e, "failed to bind");
            std::process::exit(1);
        });
    tracing::info!(address = %bind_address, "dashboard API listening");

    if let Err(e) = axum::serve(listener, build_router(state)).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
