//! Chug Board Back binary entrypoint wiring the REST API, photo storage and the storage backend.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chug_board_back::{
    config::AppConfig,
    dao::chug_store,
    photos::build_photo_store,
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let store = chug_store::connect(&config.storage)
        .await
        .context("connecting to storage backend")?;
    let photos = build_photo_store(&config.photos).context("building photo store")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        %addr,
        storage = config.storage.backend.label(),
        photos = ?config.photos.backend,
        max_photo_bytes = config.photos.max_bytes,
        "starting chug board"
    );

    let app_state = AppState::new(config, store, photos);
    tokio::spawn(storage_supervisor::run(app_state.clone()));
    let app = build_router(app_state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("chug board stopped");
    Ok(())
}

/// API routes wrapped in permissive CORS (the scoreboard UI is served elsewhere) and request tracing.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Install the fmt subscriber; `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
