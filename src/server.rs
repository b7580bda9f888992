//! HTTP surface
//!
//! # Endpoints
//!
//! - `POST /deploy?dockerimage=<ref>` - Render and apply the RayService
//! - `POST /delete` - Delete the RayService (succeeds if already gone)
//! - `POST /detect` - Proxy to the RayService detection endpoint
//! - `GET /healthz` - Health check

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{any, get};
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::forwarder::RequestForwarder;
use crate::lifecycle::{LifecycleController, Teardown};
use crate::Error;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Deploy/delete orchestration
    pub lifecycle: Arc<LifecycleController>,
    /// Detection proxy
    pub forwarder: RequestForwarder,
}

/// Query parameters for `/deploy`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeployQuery {
    /// Container image reference for the Ray head and workers
    pub dockerimage: Option<String>,
}

impl DeployQuery {
    /// Pick the known parameters out of raw query pairs.
    ///
    /// A repeated parameter keeps its first value; unknown ones are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let dockerimage = pairs
            .into_iter()
            .find(|(key, _)| key == "dockerimage")
            .map(|(_, value)| value);
        Self { dockerimage }
    }
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/deploy", any(deploy_handler))
        .route("/delete", any(delete_handler))
        .route("/detect", any(detect_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Handle `/deploy`
pub async fn deploy_handler(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<(StatusCode, String), Error> {
    require_post(&method)?;
    let Query(pairs) = query.map_err(|e| Error::validation(e.body_text()))?;
    let image = DeployQuery::from_pairs(pairs).dockerimage.unwrap_or_default();

    state
        .lifecycle
        .deploy(&image)
        .await
        .inspect_err(|e| log_failure("deploy", e))?;

    let descriptor = state.lifecycle.descriptor();
    Ok((
        StatusCode::OK,
        format!(
            "{} '{}' applied successfully in namespace '{}'",
            descriptor.kind, descriptor.name, descriptor.namespace
        ),
    ))
}

/// Handle `/delete`
pub async fn delete_handler(
    State(state): State<AppState>,
    method: Method,
) -> Result<(StatusCode, String), Error> {
    require_post(&method)?;

    let outcome = state
        .lifecycle
        .teardown()
        .await
        .inspect_err(|e| log_failure("delete", e))?;

    let d = state.lifecycle.descriptor();
    let message = match outcome {
        Teardown::Deleted => format!(
            "{} '{}' deleted successfully from namespace '{}'",
            d.kind, d.name, d.namespace
        ),
        Teardown::AlreadyAbsent => format!(
            "{} '{}' in namespace '{}' did not exist, no deletion occurred",
            d.kind, d.name, d.namespace
        ),
    };
    Ok((StatusCode::OK, message))
}

/// Handle `/detect`
pub async fn detect_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response<Body>, Error> {
    state
        .forwarder
        .forward(request)
        .await
        .inspect_err(|e| log_failure("detect", e))
}

fn require_post(method: &Method) -> Result<(), Error> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(Error::MethodNotAllowed)
    }
}

fn log_failure(operation: &str, err: &Error) {
    if err.status_code().is_server_error() {
        error!(operation, error = %err, "request failed");
    } else {
        warn!(operation, error = %err, "request rejected");
    }
}

/// Serve `router` on `listener` until `shutdown` fires.
///
/// After shutdown the listener is closed and every open connection is asked
/// to finish its in-flight request. Connections still busy after `grace` are
/// aborted, which closes their sockets.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), Error> {
    let addr = listener
        .local_addr()
        .map_err(|e| Error::internal(format!("Failed to read listener address: {}", e)))?;
    info!(addr = %addr, "Starting spotter-manager server");

    let mut connections = JoinSet::new();
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };
        connections.spawn(serve_connection(
            stream,
            peer,
            router.clone(),
            shutdown.clone(),
        ));
    }
    drop(listener);

    info!(
        grace_secs = grace.as_secs_f64(),
        open_connections = connections.len(),
        "Shutting down spotter-manager server"
    );
    let drained = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    match drained {
        Ok(()) => info!("spotter-manager server shut down cleanly"),
        Err(_) => {
            warn!(
                remaining = connections.len(),
                "grace period elapsed, closing remaining connections"
            );
            connections.shutdown().await;
        }
    }
    Ok(())
}

/// Drive one HTTP/1 or HTTP/2 connection, closing it gracefully on shutdown
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    shutdown: CancellationToken,
) {
    let builder = Builder::new(TokioExecutor::new());
    let conn =
        builder.serve_connection_with_upgrades(TokioIo::new(stream), TowerToHyperService::new(router));
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    debug!(peer = %peer, error = %e, "connection closed with error");
                }
                break;
            }
            _ = shutdown.cancelled(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

/// Bind `addr` and serve until `shutdown` fires
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), Error> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::internal(format!("Could not listen on {}: {}", addr, e)))?;
    serve(listener, router(state), shutdown, grace).await
}
