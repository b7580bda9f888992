//! Stories about the Kubernetes-backed control plane
//!
//! The RayService CRD is not assumed to be installed, so these tests drive
//! `KubeControlPlane` through a ConfigMap descriptor. Apply, delete, and the
//! not-found path are the same dynamic-API calls either way.
//!
//! - `control_plane`: server-side apply and idempotent delete

mod control_plane;
