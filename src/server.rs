use crate::config::Config;
use crate::db::{MemoryStore, PgStore, RecordStore};
use crate::routes;
use crate::translation::Translator;
use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub translator: Translator,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Result<Arc<Self>> {
        let translator = Translator::new(&config)?;
        Ok(Arc::new(Self {
            config,
            store,
            translator,
        }))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        // Translation (public)
        .route("/api/translate", post(routes::translate))
        .route("/api/translate/batch", post(routes::translate_batch))
        .route("/api/translate/languages", get(routes::languages))
        // Info records
        .route(
            "/api/info",
            post(routes::create_record).get(routes::list_records),
        )
        .route("/api/info/view/:unique_id", get(routes::view_record))
        .route(
            "/api/info/:id",
            put(routes::update_record).delete(routes::delete_record),
        )
        .route("/api/info/:id/toggle", patch(routes::toggle_record))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pick the record store, bind, and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if config.api_key.is_none() {
        warn!("API_KEY not set, admin routes only check X-Admin-Id");
    }

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, store)?;
    let chain: Vec<_> = state.translator.providers().iter().map(|p| p.name()).collect();
    info!("Translation providers: {}", chain.join(" -> "));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
