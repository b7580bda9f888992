//! spotter-manager - lifecycle manager and proxy for the Spotter RayService
//!
//! Renders a RayService manifest from a template, applies it to the cluster
//! with forced server-side apply, deletes it on request, and forwards
//! detection traffic to whatever the KubeRay operator has stood up.
//!
//! # Architecture
//!
//! ```text
//! POST /deploy ──► TemplateRenderer ──► manifest::decode ──► LifecycleController ──► ControlPlaneClient
//! POST /delete ─────────────────────────────────────────────► LifecycleController ──► ControlPlaneClient
//! POST /detect ──► RequestForwarder ──► RayService Serve endpoint
//! ```
//!
//! # Modules
//!
//! - [`template`] - Manifest template loading and rendering (minijinja)
//! - [`manifest`] - YAML/JSON decoding into an untyped resource document
//! - [`descriptor`] - Coordinates of the managed workload
//! - [`control_plane`] - Control-plane client trait and kube-rs implementation
//! - [`lifecycle`] - Deploy/teardown orchestration
//! - [`forwarder`] - Detection request proxy
//! - [`server`] - axum router, handlers, and graceful shutdown
//! - [`config`] - CLI/environment configuration
//! - [`telemetry`] - Logging setup
//! - [`error`] - Error types and HTTP mapping

#![deny(missing_docs)]

pub mod config;
pub mod control_plane;
pub mod descriptor;
pub mod error;
pub mod forwarder;
pub mod lifecycle;
pub mod manifest;
pub mod server;
pub mod telemetry;
pub mod template;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Name of the RayService this manager owns
pub const WORKLOAD_NAME: &str = "spotter-ray-service";

/// Namespace the RayService lives in
pub const WORKLOAD_NAMESPACE: &str = "spotter";

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "spotter-manager";

/// Template path, relative to the working directory of the binary
pub const DEFAULT_TEMPLATE_PATH: &str = "configs/rayservice-template.yaml";
