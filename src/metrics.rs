// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the autotrigger controller.
//!
//! All metrics carry the namespace prefix `autotrigger_knative_dev_`
//! (prometheus-safe version of "autotrigger.knative.dev").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Reconciliations by outcome, their duration and requeues
//! - **Trigger Lifecycle Metrics** - Triggers created and deleted, and failed deletions
//! - **Error Metrics** - Failed reconciliations by error kind
//!
//! # Example
//!
//! ```rust,no_run
//! use autotrigger::metrics::{gather_metrics, record_reconciliation_success};
//!
//! record_reconciliation_success("Service", std::time::Duration::from_millis(20));
//! let text = gather_metrics().unwrap();
//! ```

use crate::constants::METRICS_NAMESPACE;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by parent kind and outcome
///
/// Labels:
/// - `resource_type`: Kind of the parent resource (e.g., `Service`)
/// - `status`: Outcome (`success`, `error`, `skipped`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `resource_type`: Kind of the parent resource
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of requeues after failed reconciliations
///
/// Labels:
/// - `resource_type`: Kind of the parent resource
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeues after failed reconciliations by resource type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Trigger Lifecycle Metrics
// ============================================================================

/// Total number of Triggers created
///
/// Labels:
/// - `resource_type`: Kind of the owning parent resource
pub static TRIGGERS_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_triggers_created_total"),
        "Total number of Triggers created by parent resource type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of stale Triggers deleted
///
/// Labels:
/// - `resource_type`: Kind of the owning parent resource
pub static TRIGGERS_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_triggers_deleted_total"),
        "Total number of stale Triggers deleted by parent resource type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of stale Triggers whose deletion failed
///
/// Labels:
/// - `resource_type`: Kind of the owning parent resource
pub static TRIGGER_DELETE_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_trigger_delete_failures_total"),
        "Total number of failed stale Trigger deletions by parent resource type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of failed reconciliations by error kind
///
/// Labels:
/// - `resource_type`: Kind of the parent resource
/// - `error_type`: Error kind (`annotation_parse`, `list_triggers`, `create_trigger`, ...)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and error kind",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a reconciliation that converged the parent's Triggers
///
/// # Arguments
/// * `resource_type` - Kind of the parent resource
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation that had nothing to do (parent gone, being deleted, or bad key)
///
/// # Arguments
/// * `resource_type` - Kind of the parent resource
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_skipped(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "skipped"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `resource_type` - Kind of the parent resource
/// * `error_type` - Kind of the error that failed it
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(resource_type: &str, error_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a requeue scheduled by the error policy
pub fn record_requeue(resource_type: &str) {
    REQUEUE_TOTAL.with_label_values(&[resource_type]).inc();
}

/// Record the Trigger side effects of one reconciliation
///
/// # Arguments
/// * `resource_type` - Kind of the owning parent resource
/// * `created` - Triggers created
/// * `deleted` - Stale Triggers deleted
/// * `delete_failures` - Stale Triggers that could not be deleted
pub fn record_trigger_changes(
    resource_type: &str,
    created: usize,
    deleted: usize,
    delete_failures: usize,
) {
    #[allow(clippy::cast_precision_loss)]
    {
        TRIGGERS_CREATED_TOTAL
            .with_label_values(&[resource_type])
            .inc_by(created as f64);
        TRIGGERS_DELETED_TOTAL
            .with_label_values(&[resource_type])
            .inc_by(deleted as f64);
        TRIGGER_DELETE_FAILURES_TOTAL
            .with_label_values(&[resource_type])
            .inc_by(delete_failures as f64);
    }
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
