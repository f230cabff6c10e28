// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use autotrigger::addressable::Addressable;
use autotrigger::config::ParentType;
use autotrigger::constants::FILTER_ANNOTATION;
use kube::api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, PostParams};
use kube::client::Client;
use serde_json::json;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "autotrigger-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("Deleted test namespace: {name}"),
        Err(e) => eprintln!("Failed to delete test namespace {name}: {e}"),
    }
}

fn services(client: &Client, namespace: &str) -> Api<DynamicObject> {
    Api::namespaced_with(
        client.clone(),
        namespace,
        &ParentType::default().api_resource(),
    )
}

/// Create a Knative Service carrying the filter annotation and return its parent view
pub async fn create_annotated_service(
    client: &Client,
    namespace: &str,
    name: &str,
    annotation: &str,
) -> Result<Addressable, Box<dyn std::error::Error>> {
    let service: DynamicObject = serde_json::from_value(json!({
        "apiVersion": "serving.knative.dev/v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "annotations": { FILTER_ANNOTATION: annotation }
        },
        "spec": {
            "template": {
                "spec": {
                    "containers": [{ "image": "gcr.io/knative-releases/knative.dev/eventing/cmd/event_display" }]
                }
            }
        }
    }))?;

    let created = services(client, namespace)
        .create(&PostParams::default(), &service)
        .await?;
    Ok(Addressable::from_dynamic(
        &created,
        &ParentType::default().api_resource(),
    )?)
}

/// Replace the filter annotation of a Service and return its refreshed parent view
pub async fn set_filter_annotation(
    client: &Client,
    namespace: &str,
    name: &str,
    annotation: &str,
) -> Result<Addressable, Box<dyn std::error::Error>> {
    let patch = json!({ "metadata": { "annotations": { FILTER_ANNOTATION: annotation } } });
    let patched = services(client, namespace)
        .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(Addressable::from_dynamic(
        &patched,
        &ParentType::default().api_resource(),
    )?)
}
