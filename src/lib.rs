// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Autotrigger - Annotation-driven Knative Triggers
//!
//! Autotrigger is a Kubernetes controller that keeps the Knative eventing
//! Triggers of an addressable resource (a Knative `Service` by default) in line
//! with a JSON filter annotation on that resource.
//!
//! ## Overview
//!
//! ```text
//! metadata:
//!   annotations:
//!     trigger.eventing.knative.dev/filter: '[{"type":"dev.knative.foo"},{"broker":"b2"}]'
//! ```
//!
//! Each annotation entry becomes one Trigger owned by the resource. Edits to the
//! annotation add and remove Triggers; Triggers that already match are left alone,
//! and Triggers the resource does not control are never touched.
//!
//! ## Modules
//!
//! - [`filters`] - Annotation parsing into filter specs
//! - [`trigger_resources`] - Desired Trigger construction
//! - [`selector`] - Label selectors and ownership filtering
//! - [`reconcilers`] - The converge algorithm and its client seams
//! - [`controller`] - kube `Controller` wiring, reconcile function and error policy
//! - [`crd`] - The `Trigger` resource type
//! - [`addressable`] - Parent resource view and work-queue keys
//! - [`config`] - Command-line flags and controller configuration
//! - [`metrics`] / [`server`] - Prometheus metrics and their HTTP endpoint
//!
//! ## Example
//!
//! ```rust
//! use autotrigger::filters::{parse_filters, FilterSchema};
//! use autotrigger::constants::FILTER_ANNOTATION;
//! use std::collections::BTreeMap;
//!
//! let annotations = BTreeMap::from([(
//!     FILTER_ANNOTATION.to_string(),
//!     r#"[{"type":"foo","source":"bar"},{"broker":"b2"}]"#.to_string(),
//! )]);
//!
//! let filters = parse_filters(&annotations, FilterSchema::Attributes).unwrap();
//! assert_eq!(filters.len(), 2);
//! assert_eq!(filters[1].broker(), "b2");
//! ```

pub mod addressable;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod filters;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod selector;
pub mod server;
pub mod trigger_resources;
