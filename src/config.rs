//! Command-line and environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::DEFAULT_TEMPLATE_PATH;

/// spotter-manager - deploys the Spotter RayService and proxies detection requests
#[derive(Parser, Debug, Clone)]
#[command(name = "spotter-manager", version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SPOTTER_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Path to the RayService manifest template
    ///
    /// Read on every deploy, so edits take effect without a restart.
    #[arg(long, env = "SPOTTER_TEMPLATE", default_value = DEFAULT_TEMPLATE_PATH)]
    pub template: PathBuf,

    /// Override for the detection backend URL
    ///
    /// Defaults to the RayService head service inside the cluster.
    #[arg(long, env = "SPOTTER_DETECT_URL")]
    pub detect_url: Option<String>,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "SPOTTER_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Shutdown grace period
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
