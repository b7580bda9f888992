//! spotter-manager - deploys the Spotter RayService and proxies detection requests

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use spotter_manager::config::Config;
use spotter_manager::control_plane::KubeControlPlane;
use spotter_manager::descriptor::ResourceDescriptor;
use spotter_manager::forwarder::{ProxyTarget, RequestForwarder};
use spotter_manager::lifecycle::LifecycleController;
use spotter_manager::server::{start_server, AppState};
use spotter_manager::telemetry::init_telemetry;
use spotter_manager::template::TemplateRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // kube and reqwest both pull in rustls; pick the provider before either builds a client
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("CRITICAL: Failed to install rustls crypto provider: {:?}", e);
        std::process::exit(1);
    }

    init_telemetry()?;
    let config = Config::parse();

    let control_plane = KubeControlPlane::infer()
        .await
        .map_err(|e| anyhow::anyhow!("Kubernetes client initialization failed: {}", e))?;

    let descriptor = ResourceDescriptor::default();
    let target = ProxyTarget::resolve(config.detect_url.as_deref(), &descriptor);
    info!(
        descriptor = %descriptor,
        template = %config.template.display(),
        detect_url = %target.url,
        "spotter-manager configured"
    );

    let lifecycle = LifecycleController::new(
        descriptor,
        TemplateRenderer::new(config.template.clone()),
        Arc::new(control_plane),
    );
    let state = AppState {
        lifecycle: Arc::new(lifecycle),
        forwarder: RequestForwarder::new(target)?,
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    start_server(config.listen, state, shutdown, config.shutdown_grace()).await?;
    info!("spotter-manager server shutdown successfully");
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
    shutdown.cancel();
}
