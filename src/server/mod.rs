//! Thin HTTP file server over a vocabulary directory.
//!
//! `GET /api/vocabulary` lists the tree, `GET /api/vocabulary/<path>` serves
//! one file. The tree is rescanned on every listing request, so edits on disk
//! show up without a restart.

mod handlers;

use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

use axum::{
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tracing::{
    info,
    warn,
};

use crate::core::{
    AppConfig,
    KosakataError,
};

#[derive(Debug, Clone)]
pub struct ServerState {
    root: Arc<PathBuf>,
}

impl ServerState {
    pub fn new(root: PathBuf) -> Self {
        Self { root: Arc::new(root) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/api/vocabulary", get(handlers::tree_handler))
        .route("/api/vocabulary/*path", get(handlers::file_handler))
        .layer(middleware::from_fn(handlers::cors_middleware))
        .with_state(state)
}

/// Binds `config.bind` and serves until Ctrl-C.
pub async fn serve(config: &AppConfig) -> Result<(), KosakataError> {
    let root = config.vocabulary_root.clone();
    if !root.is_dir() {
        warn!(root = %root.display(), "vocabulary root does not exist yet; listings will fail until it does");
    }

    let listener = TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    info!(%addr, root = %root.display(), "vocabulary server listening");

    axum::serve(listener, build_router(ServerState::new(root)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vocabulary server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
