//! Lifecycle controller for the singleton RayService
//!
//! Two operations, each atomic from the caller's view:
//! - `deploy`: render → decode → forced server-side apply
//! - `teardown`: delete, with not-found folded into success
//!
//! Both are safe to retry. Concurrent deploys race at the API server and the
//! last accepted apply wins; no client-side sequencing is imposed.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::control_plane::{ControlPlaneClient, DeleteStatus};
use crate::descriptor::ResourceDescriptor;
use crate::manifest;
use crate::template::{RenderParams, TemplateRenderer};
use crate::Error;

/// Successful deploy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Identifier the control plane assigned to the resource
    pub uid: String,
}

/// Successful teardown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Teardown {
    /// The resource existed and was deleted
    Deleted,
    /// The resource was already gone
    AlreadyAbsent,
}

/// Orchestrates deploy and teardown against one fixed descriptor
pub struct LifecycleController {
    descriptor: ResourceDescriptor,
    renderer: TemplateRenderer,
    client: Arc<dyn ControlPlaneClient>,
}

impl LifecycleController {
    /// Create a controller for `descriptor`, rendering from `renderer`
    pub fn new(
        descriptor: ResourceDescriptor,
        renderer: TemplateRenderer,
        client: Arc<dyn ControlPlaneClient>,
    ) -> Self {
        Self {
            descriptor,
            renderer,
            client,
        }
    }

    /// The workload this controller manages
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// Render the manifest for `image` and upsert it.
    ///
    /// Validation, template, and decode failures all happen before the
    /// control plane is contacted.
    #[instrument(skip(self), fields(workload = %self.descriptor.name))]
    pub async fn deploy(&self, image: &str) -> Result<Applied, Error> {
        let image = image.trim();
        if image.is_empty() {
            return Err(Error::validation(
                "Missing required query parameter: dockerimage",
            ));
        }
        info!(image = %image, "deploying RayService");

        let rendered = self
            .renderer
            .render(&RenderParams::for_image(image))
            .await?;
        let document = manifest::decode(&rendered)?.bind_to(&self.descriptor);

        info!(descriptor = %self.descriptor, "applying RayService configuration");
        let uid = self
            .client
            .apply(&self.descriptor, &document)
            .await
            .map_err(|source| Error::Apply {
                descriptor: self.descriptor.clone(),
                source,
            })?;

        info!(descriptor = %self.descriptor, uid = %uid, "RayService applied");
        Ok(Applied { uid })
    }

    /// Delete the workload. Deleting something already gone is a success.
    #[instrument(skip(self), fields(workload = %self.descriptor.name))]
    pub async fn teardown(&self) -> Result<Teardown, Error> {
        info!(descriptor = %self.descriptor, "deleting RayService");
        match self.client.delete(&self.descriptor).await {
            Ok(DeleteStatus::Deleted) => {
                info!(descriptor = %self.descriptor, "RayService deletion initiated");
                Ok(Teardown::Deleted)
            }
            Ok(DeleteStatus::NotFound) => {
                warn!(descriptor = %self.descriptor, "RayService not found, nothing to delete");
                Ok(Teardown::AlreadyAbsent)
            }
            Err(source) => Err(Error::Delete {
                descriptor: self.descriptor.clone(),
                source,
            }),
        }
    }
}
