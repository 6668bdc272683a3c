use std::sync::Arc;

use customer_manager::{
    build_router,
    config::StoreBackend,
    database, load_config,
    queries::PgStore,
    services::uploads::ProfileImageStorage,
    store::{MemoryStore, SharedStore},
    workers::spawn_upload_cleanup_worker,
    AppState,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
    sync::broadcast,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = load_config()?;
    info!("Loaded configuration:\n{}", config);

    let store: SharedStore = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = database::connect(&config.database).await?;
            database::run_migrations(&pool).await?;
            info!("Connected to PostgreSQL at {}:{}", config.database.host, config.database.port);
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let uploads = Arc::new(ProfileImageStorage::new(
        &config.storage.base_path,
        config.storage.max_upload_bytes,
    ));
    uploads.init().await?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (upload_cleanup, upload_cleanup_handle) =
        spawn_upload_cleanup_worker(uploads.clone(), shutdown_rx);

    let state = AppState::new(
        store,
        config.jwt.secret.clone(),
        config.jwt.expiration_hours,
        uploads,
        upload_cleanup,
    );
    let app = build_router(state, &config.server.cors_origin)?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(());
    if let Err(e) = upload_cleanup_handle.await {
        warn!("Upload cleanup worker did not stop cleanly: {}", e);
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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
}
