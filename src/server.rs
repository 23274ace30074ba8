//! HTTP surface: pages, the tree report and the source PGN as JSON/text over axum.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info, warn};

use crate::cache::TreeCache;
use crate::config::Config;
use crate::error::Error;
use crate::report::TreeReport;
use crate::tree::{GameTree, NodeId, ROOT_NODE_ID};
use crate::view::PageView;

/// Shared by every request.
#[derive(Debug)]
pub struct ServiceState {
    pub config: Config,
    pub cache: TreeCache,
}

impl ServiceState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: TreeCache::new(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Io(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self }))).into_response()
    }
}

pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/", get(root_page))
        .route("/node/:target", get(target_page))
        .route("/node/:target/:board", get(focus_page))
        .route("/report", get(report))
        .route("/pgn", get(pgn_text))
        .layer(Extension(state))
}

async fn load_tree(state: &Arc<ServiceState>) -> Result<Arc<GameTree>, Error> {
    let state = state.clone();
    tokio::task::spawn_blocking(move || state.cache.get_or_load(&state.config.pgn_path)).await?
}

async fn page(state: &Arc<ServiceState>, target: NodeId, board: NodeId) -> Result<Json<PageView>, Error> {
    let tree = load_tree(state).await?;
    Ok(Json(PageView::compose(
        &tree,
        target,
        board,
        &state.config.view_options(),
    )))
}

async fn root_page(Extension(state): Extension<Arc<ServiceState>>) -> Result<Json<PageView>, Error> {
    page(&state, ROOT_NODE_ID, ROOT_NODE_ID).await
}

async fn target_page(
    Extension(state): Extension<Arc<ServiceState>>,
    Path(target): Path<NodeId>,
) -> Result<Json<PageView>, Error> {
    page(&state, target, target).await
}

async fn focus_page(
    Extension(state): Extension<Arc<ServiceState>>,
    Path((target, board)): Path<(NodeId, NodeId)>,
) -> Result<Json<PageView>, Error> {
    page(&state, target, board).await
}

async fn report(Extension(state): Extension<Arc<ServiceState>>) -> Result<Json<TreeReport>, Error> {
    let tree = load_tree(&state).await?;
    Ok(Json(TreeReport::characterize(&tree)))
}

async fn pgn_text(Extension(state): Extension<Arc<ServiceState>>) -> Result<String, Error> {
    Ok(tokio::fs::read_to_string(&state.config.pgn_path).await?)
}

/// Build the tree once up front, then serve until interrupted.
pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = std::net::TcpListener::bind(&config.bind_address)?;
    let address = listener.local_addr()?;
    let state = Arc::new(ServiceState::new(config));

    let tree = load_tree(&state).await?;
    info!(
        "Serving {} ({} positions) on http://{}",
        state.config.pgn_path.display(),
        tree.len(),
        address
    );

    axum::Server::from_tcp(listener)?
        .serve(router(state).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;
    info!("Server stopped");
    Ok(())
}
