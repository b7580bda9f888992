//! Coordinates of the singleton workload this manager controls

use std::fmt;

use kube::api::GroupVersionKind;
use kube::discovery::ApiResource;

use crate::{WORKLOAD_NAME, WORKLOAD_NAMESPACE};

/// Port the RayService head exposes Serve traffic on
const SERVE_PORT: u16 = 8000;

/// Stable (group, version, kind, namespace, name) of the managed workload.
///
/// Built once at startup and never mutated; every apply and delete targets it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// API group (e.g., "ray.io")
    pub group: String,
    /// API version within the group (e.g., "v1alpha1")
    pub version: String,
    /// Resource kind (e.g., "RayService")
    pub kind: String,
    /// Plural resource name used in API paths (e.g., "rayservices")
    pub plural: String,
    /// Namespace the workload lives in
    pub namespace: String,
    /// Name of the workload
    pub name: String,
}

impl Default for ResourceDescriptor {
    fn default() -> Self {
        Self {
            group: "ray.io".to_string(),
            version: "v1alpha1".to_string(),
            kind: "RayService".to_string(),
            plural: "rayservices".to_string(),
            namespace: WORKLOAD_NAMESPACE.to_string(),
            name: WORKLOAD_NAME.to_string(),
        }
    }
}

impl ResourceDescriptor {
    /// Full apiVersion string (e.g., "ray.io/v1alpha1")
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// kube-rs ApiResource for dynamic API access.
    ///
    /// The plural is taken from the descriptor rather than guessed from the kind.
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }

    /// In-cluster URL of the workload's detection endpoint.
    ///
    /// KubeRay exposes the head node as `<name>-head-svc`.
    pub fn default_detect_url(&self) -> String {
        format!(
            "http://{}-head-svc.{}.svc.cluster.local:{}/detect",
            self.name, self.namespace, SERVE_PORT
        )
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' in namespace '{}'",
            self.kind, self.name, self.namespace
        )
    }
}
