//! Control-plane client seam
//!
//! [`ControlPlaneClient`] is the only way the lifecycle controller touches the
//! cluster. Production uses [`KubeControlPlane`] (kube-rs dynamic API with
//! server-side apply); tests inject fakes.

use std::time::Duration;

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, Patch, PatchParams};
use kube::Client;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::descriptor::ResourceDescriptor;
use crate::manifest::ResourceDocument;
use crate::FIELD_MANAGER;

/// Connection timeout for the kube client
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read timeout for the kube client
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors reported by a control-plane client
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Request rejected for a reason the client could only describe as text
    #[error("{0}")]
    Rejected(String),
}

/// Result of a delete call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The resource existed and deletion was accepted
    Deleted,
    /// There was nothing to delete
    NotFound,
}

/// Capability to upsert and remove one resource on the control plane.
///
/// Implementations must be safe to call from many request tasks at once.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Forced, fully declarative upsert of `document` at `descriptor`.
    ///
    /// Returns the identifier (UID) the control plane assigned.
    async fn apply(
        &self,
        descriptor: &ResourceDescriptor,
        document: &ResourceDocument,
    ) -> Result<String, ControlPlaneError>;

    /// Delete the resource at `descriptor`
    async fn delete(&self, descriptor: &ResourceDescriptor)
        -> Result<DeleteStatus, ControlPlaneError>;
}

/// Kubernetes-backed control plane
#[derive(Clone)]
pub struct KubeControlPlane {
    client: Client,
}

impl KubeControlPlane {
    /// Wrap an existing kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from in-cluster config, falling back to kubeconfig
    pub async fn infer() -> Result<Self, kube::Error> {
        let mut config = kube::Config::infer()
            .await
            .map_err(kube::Error::InferConfig)?;
        config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
        config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
        let client = Client::try_from(config)?;
        info!("Kubernetes client initialized");
        Ok(Self::new(client))
    }

    fn api(&self, descriptor: &ResourceDescriptor) -> Api<DynamicObject> {
        Api::namespaced_with(
            self.client.clone(),
            &descriptor.namespace,
            &descriptor.api_resource(),
        )
    }
}

#[async_trait]
impl ControlPlaneClient for KubeControlPlane {
    async fn apply(
        &self,
        descriptor: &ResourceDescriptor,
        document: &ResourceDocument,
    ) -> Result<String, ControlPlaneError> {
        let params = PatchParams::apply(FIELD_MANAGER).force();
        let applied = self
            .api(descriptor)
            .patch(&descriptor.name, &params, &Patch::Apply(document.as_value()))
            .await?;
        let uid = applied.metadata.uid.unwrap_or_default();
        debug!(%descriptor, uid = %uid, "server-side apply accepted");
        Ok(uid)
    }

    async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<DeleteStatus, ControlPlaneError> {
        match self
            .api(descriptor)
            .delete(&descriptor.name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(DeleteStatus::Deleted),
            Err(e) if is_not_found(&e) => Ok(DeleteStatus::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether a kube error is the API server's 404
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}
