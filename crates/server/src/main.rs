mod api;
mod config;
mod range;
mod sniff;
mod state;
mod streaming;
mod utils;

use std::sync::Arc;

use api::api_router;
use catalog::SongIndex;
use common::HashStore;
use config::{apply_env_overrides, config_path_from_env, load_or_create_config, resolve_path};
use sniff::InferSniffer;
use state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (mut config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }
    apply_env_overrides(&mut config)?;

    let catalog_path = resolve_path(&config_path, &config.catalog_path);
    let files_root = resolve_path(&config_path, &config.files_root);

    // A broken catalog is fatal; a missing file tree only means every media request 404s.
    let index = SongIndex::load(&catalog_path)?;
    if index.is_empty() {
        warn!("Catalog {} contains no songs", catalog_path.display());
    }
    if !files_root.is_dir() {
        warn!("Files root {} does not exist", files_root.display());
    }
    info!(
        "Serving {} songs from {} (files under {})",
        index.len(),
        catalog_path.display(),
        files_root.display()
    );

    let state = AppState::new(index, HashStore::new(files_root), Arc::new(InferSniffer));
    let cors = if config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let app = api_router(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http());

    let bind_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", err);
        }
    }

    info!("Shutdown signal received.");
}
