//! Server-side apply and delete against a live API server

use serde_json::json;

use spotter_manager::control_plane::{ControlPlaneClient, DeleteStatus, KubeControlPlane};
use spotter_manager::descriptor::ResourceDescriptor;
use spotter_manager::manifest::ResourceDocument;

fn configmap_descriptor(name: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        group: String::new(),
        version: "v1".to_string(),
        kind: "ConfigMap".to_string(),
        plural: "configmaps".to_string(),
        namespace: "default".to_string(),
        name: name.to_string(),
    }
}

fn configmap(descriptor: &ResourceDescriptor, image: &str) -> ResourceDocument {
    ResourceDocument::from_value(json!({
        "data": { "image": image }
    }))
    .expect("non-empty document")
    .bind_to(descriptor)
}

/// Story: the manager redeploys and then tears down its workload
///
/// The second apply updates the same object in place, and the delete after
/// the object is gone reports NotFound instead of failing.
#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn story_apply_update_delete_against_cluster() {
    let plane = KubeControlPlane::infer().await.expect("kube client");
    let descriptor = configmap_descriptor("spotter-manager-kind-test");

    // Leftovers from an aborted run
    plane.delete(&descriptor).await.expect("cleanup delete");

    let first = plane
        .apply(&descriptor, &configmap(&descriptor, "repo/spotter:v1"))
        .await
        .expect("first apply");
    assert!(!first.is_empty());

    let second = plane
        .apply(&descriptor, &configmap(&descriptor, "repo/spotter:v2"))
        .await
        .expect("second apply");
    assert_eq!(first, second, "apply must update in place");

    assert_eq!(
        plane.delete(&descriptor).await.expect("delete"),
        DeleteStatus::Deleted
    );
    assert_eq!(
        plane.delete(&descriptor).await.expect("repeat delete"),
        DeleteStatus::NotFound
    );
}
