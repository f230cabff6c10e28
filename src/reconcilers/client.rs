// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! External interfaces the Trigger reconciler depends on.
//!
//! The reconciler never talks to the API server directly. It reads parents
//! through a [`ParentSource`] and manages Triggers through a [`TriggerClient`],
//! which keeps the converge algorithm independent of kube and lets tests drive
//! it with an in-memory implementation.
//!
//! # Implementations
//!
//! - [`StoreParentSource`] reads parents from the controller's reflector cache.
//! - [`KubeTriggerClient`] manages Triggers through `kube::Api<Trigger>`.

use crate::addressable::Addressable;
use crate::crd::Trigger;
use crate::errors::{kube_error_code, AutoTriggerError};
use crate::selector::selector_from_labels;
use kube::api::{ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::runtime::reflector::{ObjectRef, Store};
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Read access to parent resources.
#[async_trait::async_trait]
pub trait ParentSource: Send + Sync {
    /// Fetch the current state of a parent.
    ///
    /// # Errors
    ///
    /// Returns [`AutoTriggerError::ParentNotFound`] if the parent does not exist,
    /// or another error if it cannot be read.
    async fn get_parent(&self, namespace: &str, name: &str)
        -> Result<Addressable, AutoTriggerError>;
}

/// CRUD access to Trigger resources.
#[async_trait::async_trait]
pub trait TriggerClient: Send + Sync {
    /// List the Triggers in `namespace` carrying every label in `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`AutoTriggerError::ListTriggers`] if the list call fails.
    async fn list_triggers(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<Trigger>, AutoTriggerError>;

    /// Create a Trigger, returning the object as stored by the API server.
    ///
    /// # Errors
    ///
    /// Returns [`AutoTriggerError::CreateTrigger`] if the create call fails.
    async fn create_trigger(
        &self,
        namespace: &str,
        trigger: &Trigger,
    ) -> Result<Trigger, AutoTriggerError>;

    /// Delete the Trigger `name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`AutoTriggerError::DeleteTrigger`] if the delete call fails.
    async fn delete_trigger(&self, namespace: &str, name: &str) -> Result<(), AutoTriggerError>;
}

/// [`ParentSource`] backed by the controller's reflector store.
///
/// Reading from the watch cache matches what the controller reacts to and costs
/// no API round-trip.
#[derive(Clone)]
pub struct StoreParentSource {
    store: Store<DynamicObject>,
    resource: ApiResource,
}

impl StoreParentSource {
    #[must_use]
    pub fn new(store: Store<DynamicObject>, resource: ApiResource) -> Self {
        Self { store, resource }
    }
}

#[async_trait::async_trait]
impl ParentSource for StoreParentSource {
    async fn get_parent(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Addressable, AutoTriggerError> {
        let mut obj_ref = ObjectRef::<DynamicObject>::new_with(name, self.resource.clone());
        if !namespace.is_empty() {
            obj_ref = obj_ref.within(namespace);
        }

        let obj = self
            .store
            .get(&obj_ref)
            .ok_or_else(|| AutoTriggerError::ParentNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        Addressable::from_dynamic(&obj, &self.resource)
    }
}

/// [`TriggerClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeTriggerClient {
    client: Client,
}

impl KubeTriggerClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Trigger> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait::async_trait]
impl TriggerClient for KubeTriggerClient {
    async fn list_triggers(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<Trigger>, AutoTriggerError> {
        let label_selector = selector_from_labels(selector);
        debug!(namespace = %namespace, selector = %label_selector, "Listing Triggers");

        let list = self
            .api(namespace)
            .list(&ListParams::default().labels(&label_selector))
            .await
            .map_err(|e| AutoTriggerError::ListTriggers {
                namespace: namespace.to_string(),
                code: kube_error_code(&e),
                reason: e.to_string(),
            })?;

        Ok(list.items)
    }

    async fn create_trigger(
        &self,
        namespace: &str,
        trigger: &Trigger,
    ) -> Result<Trigger, AutoTriggerError> {
        self.api(namespace)
            .create(&PostParams::default(), trigger)
            .await
            .map_err(|e| AutoTriggerError::CreateTrigger {
                namespace: namespace.to_string(),
                parent: parent_name(trigger),
                code: kube_error_code(&e),
                reason: e.to_string(),
            })
    }

    async fn delete_trigger(&self, namespace: &str, name: &str) -> Result<(), AutoTriggerError> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| AutoTriggerError::DeleteTrigger {
                namespace: namespace.to_string(),
                name: name.to_string(),
                code: kube_error_code(&e),
                reason: e.to_string(),
            })
    }
}

/// Name of the controlling owner of a Trigger, for error messages.
pub(crate) fn parent_name(trigger: &Trigger) -> String {
    trigger
        .metadata
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|owner| owner.controller == Some(true))
        .map(|owner| owner.name.clone())
        .unwrap_or_default()
}
