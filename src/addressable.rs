// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The parent resource as seen by the reconciler.
//!
//! The controller watches an arbitrary addressable kind (a Knative `Service` by
//! default) through `DynamicObject`, so reconciliation works on the handful of
//! identity fields it actually needs rather than a typed spec.

use crate::errors::AutoTriggerError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ApiResource, DynamicObject};
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Identity, annotations and deletion state of a watched parent resource.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Addressable {
    pub namespace: String,
    pub name: String,
    pub kind: String,
    pub api_version: String,
    pub uid: String,
    pub annotations: BTreeMap<String, String>,
    /// Set by the API server once deletion has been requested.
    pub deletion_timestamp: Option<Time>,
}

impl Addressable {
    /// Build the parent view from a watched object.
    ///
    /// Objects delivered through list responses may lack `apiVersion`/`kind`;
    /// those are then taken from the `ApiResource` the controller watches.
    ///
    /// # Errors
    ///
    /// Returns [`AutoTriggerError::InvalidParent`] if the object has no name or uid.
    pub fn from_dynamic(
        obj: &DynamicObject,
        resource: &ApiResource,
    ) -> Result<Self, AutoTriggerError> {
        let name = obj
            .metadata
            .name
            .clone()
            .ok_or_else(|| AutoTriggerError::InvalidParent {
                reason: "object has no name".to_string(),
            })?;

        let uid = obj
            .metadata
            .uid
            .clone()
            .ok_or_else(|| AutoTriggerError::InvalidParent {
                reason: format!("object {name} has no uid"),
            })?;

        let (api_version, kind) = match &obj.types {
            Some(types) if !types.api_version.is_empty() && !types.kind.is_empty() => {
                (types.api_version.clone(), types.kind.clone())
            }
            _ => (resource.api_version.clone(), resource.kind.clone()),
        };

        Ok(Self {
            namespace: obj.namespace().unwrap_or_default(),
            name,
            kind,
            api_version,
            uid,
            annotations: obj.annotations().clone(),
            deletion_timestamp: obj.metadata.deletion_timestamp.clone(),
        })
    }

    /// Work-queue key of this resource.
    #[must_use]
    pub fn key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }

    #[must_use]
    pub fn is_being_deleted(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// Join namespace and name into a work-queue key.
///
/// Cluster-scoped objects have an empty namespace and their key is the bare name.
#[must_use]
pub fn object_key(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}/{name}")
    }
}

/// Split a work-queue key into `(namespace, name)`.
///
/// Accepts `namespace/name` and, for cluster-scoped objects, a bare `name`.
///
/// # Errors
///
/// Returns [`AutoTriggerError::InvalidKey`] for keys with more than one `/`
/// or with an empty name.
pub fn split_key(key: &str) -> Result<(String, String), AutoTriggerError> {
    let invalid = || AutoTriggerError::InvalidKey {
        key: key.to_string(),
    };

    let parts: Vec<&str> = key.split('/').collect();
    let (namespace, name) = match parts.as_slice() {
        [name] => ("", *name),
        [namespace, name] => (*namespace, *name),
        _ => return Err(invalid()),
    };

    if name.is_empty() {
        return Err(invalid());
    }

    Ok((namespace.to_string(), name.to_string()))
}

#[cfg(test)]
#[path = "addressable_tests.rs"]
mod addressable_tests;
