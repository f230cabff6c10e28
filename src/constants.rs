// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the autotrigger controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Annotation Constants
// ============================================================================

/// Annotation on the parent resource holding the JSON array of trigger filters
pub const FILTER_ANNOTATION: &str = "trigger.eventing.knative.dev/filter";

/// Filter key selecting the target broker
pub const BROKER_KEY: &str = "broker";

/// Broker used when a filter does not name one
pub const DEFAULT_BROKER: &str = "default";

/// Filter key for the event type in the source-and-type schema
pub const TYPE_KEY: &str = "type";

/// Filter key for the event source in the source-and-type schema
pub const SOURCE_KEY: &str = "source";

/// Value matching any type or source in the source-and-type schema
pub const ANY_FILTER: &str = "";

// ============================================================================
// API Constants
// ============================================================================

/// Default API group of the watched parent resource
pub const DEFAULT_PARENT_GROUP: &str = "serving.knative.dev";

/// Default API version of the watched parent resource
pub const DEFAULT_PARENT_VERSION: &str = "v1";

/// Default kind of the watched parent resource
pub const DEFAULT_PARENT_KIND: &str = "Service";

// ============================================================================
// Naming Constants
// ============================================================================

/// Kubernetes truncates `generateName` prefixes to this length before adding
/// the random suffix; keeping the prefix within it keeps names predictable.
pub const MAX_GENERATE_NAME_PREFIX_LEN: usize = 58;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Initial requeue delay after a failed reconciliation
pub const DEFAULT_REQUEUE_BASE_SECS: u64 = 5;

/// Upper bound for the requeue delay of a repeatedly failing key
pub const DEFAULT_REQUEUE_MAX_SECS: u64 = 300;

/// Requeue delay growth factor per consecutive failure
pub const REQUEUE_BACKOFF_MULTIPLIER: u32 = 2;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Name used for the controller's runtime threads
pub const CONTROLLER_NAME: &str = "autotrigger-controller";

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Default bind address for the metrics and health endpoints
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Namespace prefix for all metrics (prometheus-safe version of "autotrigger.knative.dev")
pub const METRICS_NAMESPACE: &str = "autotrigger_knative_dev";
