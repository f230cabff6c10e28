// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition types for Knative eventing Triggers.
//!
//! The controller does not own the `Trigger` CRD; these types mirror the
//! `eventing.knative.dev/v1alpha1` schema closely enough to create, list and
//! compare Triggers through the typed `kube::Api`.
//!
//! # Example
//!
//! ```rust,no_run
//! use autotrigger::crd::{Destination, KReference, TriggerFilter, TriggerSpec};
//! use std::collections::BTreeMap;
//!
//! let spec = TriggerSpec {
//!     broker: "default".to_string(),
//!     filter: Some(TriggerFilter {
//!         source_and_type: None,
//!         attributes: Some(BTreeMap::from([("type".to_string(), "dev.example.ping".to_string())])),
//!     }),
//!     subscriber: Destination {
//!         reference: Some(KReference {
//!             api_version: "serving.knative.dev/v1".to_string(),
//!             kind: "Service".to_string(),
//!             name: "event-display".to_string(),
//!             namespace: None,
//!         }),
//!         uri: None,
//!     },
//!     deprecated_generation: None,
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `Trigger` subscribes an addressable to events from a broker.
///
/// # Example
///
/// ```yaml
/// apiVersion: eventing.knative.dev/v1alpha1
/// kind: Trigger
/// metadata:
///   generateName: event-display-service-
///   namespace: default
/// spec:
///   broker: default
///   filter:
///     attributes:
///       type: dev.example.ping
///   subscriber:
///     ref:
///       apiVersion: serving.knative.dev/v1
///       kind: Service
///       name: event-display
/// ```
#[derive(CustomResource, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "eventing.knative.dev",
    version = "v1alpha1",
    kind = "Trigger",
    namespaced,
    derive = "PartialEq",
    doc = "Trigger routes events from a Broker to a subscriber, optionally filtered by event attributes."
)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    /// Name of the Broker this Trigger receives events from.
    #[serde(default)]
    pub broker: String,

    /// Event filter; absent means every event on the broker is delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<TriggerFilter>,

    /// Destination receiving the filtered events.
    pub subscriber: Destination,

    /// Legacy generation counter kept in the spec by older eventing releases.
    ///
    /// Carries no intent and is ignored when comparing Triggers.
    #[serde(default, rename = "generation", skip_serializing_if = "Option::is_none")]
    pub deprecated_generation: Option<i64>,
}

/// Filter applied by a Trigger. Exactly one of the two forms is normally set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerFilter {
    /// Legacy exact-match filter on event type and source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_and_type: Option<TriggerFilterSourceAndType>,

    /// Exact-match filter on arbitrary CloudEvent attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

/// Legacy type/source filter. An empty value matches anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriggerFilterSourceAndType {
    #[serde(rename = "type", default)]
    pub event_type: String,

    #[serde(default)]
    pub source: String,
}

/// Where a Trigger delivers events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Destination {
    /// Reference to an addressable object.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<KReference>,

    /// Absolute URI, or a path relative to the referenced object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Reference to a Kubernetes object by apiVersion, kind and name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,

    /// Defaults to the namespace of the referring object when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
