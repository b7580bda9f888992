//! In-memory control plane
//!
//! Behaves like server-side apply against a single store: apply overwrites,
//! delete removes, and a missing object reports NotFound.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use spotter_manager::control_plane::{ControlPlaneClient, ControlPlaneError, DeleteStatus};
use spotter_manager::descriptor::ResourceDescriptor;
use spotter_manager::manifest::ResourceDocument;

#[derive(Default)]
pub struct InMemoryControlPlane {
    objects: Mutex<BTreeMap<String, (String, Value)>>,
    applies: AtomicUsize,
    deletes: AtomicUsize,
    next_uid: AtomicUsize,
}

impl InMemoryControlPlane {
    fn key(descriptor: &ResourceDescriptor) -> String {
        format!(
            "{}/{}/{}/{}",
            descriptor.api_version(),
            descriptor.plural,
            descriptor.namespace,
            descriptor.name
        )
    }

    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Stored document for `descriptor`, if any
    pub fn get(&self, descriptor: &ResourceDescriptor) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&Self::key(descriptor))
            .map(|(_, doc)| doc.clone())
    }

    /// UID assigned to `descriptor`, if present
    pub fn uid(&self, descriptor: &ResourceDescriptor) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&Self::key(descriptor))
            .map(|(uid, _)| uid.clone())
    }
}

#[async_trait]
impl ControlPlaneClient for InMemoryControlPlane {
    async fn apply(
        &self,
        descriptor: &ResourceDescriptor,
        document: &ResourceDocument,
    ) -> Result<String, ControlPlaneError> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.objects.lock().unwrap();
        let entry = objects.entry(Self::key(descriptor)).or_insert_with(|| {
            let n = self.next_uid.fetch_add(1, Ordering::SeqCst);
            (format!("uid-{}", n), Value::Null)
        });
        entry.1 = document.as_value().clone();
        Ok(entry.0.clone())
    }

    async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<DeleteStatus, ControlPlaneError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        match self.objects.lock().unwrap().remove(&Self::key(descriptor)) {
            Some(_) => Ok(DeleteStatus::Deleted),
            None => Ok(DeleteStatus::NotFound),
        }
    }
}

/// Control plane that refuses everything
pub struct FailingControlPlane(pub &'static str);

#[async_trait]
impl ControlPlaneClient for FailingControlPlane {
    async fn apply(
        &self,
        _descriptor: &ResourceDescriptor,
        _document: &ResourceDocument,
    ) -> Result<String, ControlPlaneError> {
        Err(ControlPlaneError::Rejected(self.0.to_string()))
    }

    async fn delete(
        &self,
        _descriptor: &ResourceDescriptor,
    ) -> Result<DeleteStatus, ControlPlaneError> {
        Err(ControlPlaneError::Rejected(self.0.to_string()))
    }
}
