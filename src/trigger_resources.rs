// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Trigger resource builders
//!
//! This module turns a parent resource and its filter annotation into the
//! Triggers that should exist for it. All functions are pure and easily testable.
//!
//! Built Triggers carry a `generateName` rather than a name, so the API server
//! appends a random suffix on create. Names therefore differ between
//! reconciliations and are never used to match desired against existing Triggers;
//! labels, owner and spec are.

use crate::addressable::Addressable;
use crate::constants::MAX_GENERATE_NAME_PREFIX_LEN;
use crate::crd::{Destination, KReference, Trigger, TriggerSpec};
use crate::errors::AutoTriggerError;
use crate::filters::{parse_filters, FilterSchema, FilterSpec};
use crate::labels::{
    AUTOTRIGGER_PARENT_KIND_LABEL, AUTOTRIGGER_PARENT_NAME_LABEL, K8S_MANAGED_BY,
    MANAGED_BY_AUTOTRIGGER,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the labels stamped on, and later used to select, the Triggers of a parent.
///
/// # Arguments
///
/// * `parent` - The parent resource
///
/// # Returns
///
/// A `BTreeMap` of label key-value pairs that depends only on the parent's kind and name
#[must_use]
pub fn make_labels(parent: &Addressable) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_AUTOTRIGGER.into());
    labels.insert(AUTOTRIGGER_PARENT_KIND_LABEL.into(), parent.kind.clone());
    labels.insert(AUTOTRIGGER_PARENT_NAME_LABEL.into(), parent.name.clone());
    labels
}

/// Deterministic name prefix for the Triggers of a parent, e.g. `event-display-service`.
///
/// The result plus the `-` separator never exceeds the length the API server
/// keeps from a `generateName`.
#[must_use]
pub fn trigger_name_prefix(parent: &Addressable) -> String {
    let mut prefix = format!("{}-{}", parent.name, parent.kind.to_lowercase());
    // Names and lowercased kinds are ASCII, so byte truncation stays on a char boundary.
    prefix.truncate(MAX_GENERATE_NAME_PREFIX_LEN - 1);
    prefix
}

/// Controller owner reference pointing at the parent.
///
/// Makes the Trigger subject to cascading deletion and identifies it as owned.
#[must_use]
pub fn make_owner_reference(parent: &Addressable) -> OwnerReference {
    OwnerReference {
        api_version: parent.api_version.clone(),
        kind: parent.kind.clone(),
        name: parent.name.clone(),
        uid: parent.uid.clone(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Subscriber that routes events back to the parent.
#[must_use]
pub fn make_subscriber(parent: &Addressable) -> Destination {
    Destination {
        reference: Some(KReference {
            api_version: parent.api_version.clone(),
            kind: parent.kind.clone(),
            name: parent.name.clone(),
            namespace: None,
        }),
        uri: None,
    }
}

/// Build one Trigger for one parsed filter.
#[must_use]
pub fn make_trigger(parent: &Addressable, filter: &FilterSpec) -> Trigger {
    Trigger {
        metadata: ObjectMeta {
            generate_name: Some(format!("{}-", trigger_name_prefix(parent))),
            namespace: Some(parent.namespace.clone()),
            owner_references: Some(vec![make_owner_reference(parent)]),
            labels: Some(make_labels(parent)),
            ..Default::default()
        },
        spec: TriggerSpec {
            broker: filter.broker().to_string(),
            filter: Some(filter.trigger_filter()),
            subscriber: make_subscriber(parent),
            deprecated_generation: None,
        },
    }
}

/// Build every Trigger the parent's filter annotation asks for, in annotation order.
///
/// Returns an empty list when the parent carries no filter annotation.
///
/// # Errors
///
/// Returns [`AutoTriggerError::AnnotationParse`] if the annotation is malformed.
pub fn make_triggers(
    parent: &Addressable,
    schema: FilterSchema,
) -> Result<Vec<Trigger>, AutoTriggerError> {
    let filters = parse_filters(&parent.annotations, schema)?;

    debug!(
        namespace = %parent.namespace,
        name = %parent.name,
        count = filters.len(),
        schema = %schema,
        "Built desired Triggers from filter annotation"
    );

    Ok(filters
        .iter()
        .map(|filter| make_trigger(parent, filter))
        .collect())
}

#[cfg(test)]
#[path = "trigger_resources_tests.rs"]
mod trigger_resources_tests;
