// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller wiring for the watched parent resource.
//!
//! The parent kind is only known at runtime, so the controller watches it as a
//! [`DynamicObject`] described by the configured [`ApiResource`]. Each event is
//! reduced to a `namespace/name` key and handed to the [`TriggerReconciler`].
//! Triggers themselves are not watched: a change to a Trigger never starts a
//! reconciliation.
//!
//! - A successful reconciliation waits for the next change to the parent.
//! - A failed one is requeued with a per-object exponential delay.
//!
//! [`ApiResource`]: kube::api::ApiResource
//! [`TriggerReconciler`]: crate::reconcilers::TriggerReconciler

use crate::addressable::object_key;
use crate::config::ControllerConfig;
use crate::context::Context;
use crate::errors::AutoTriggerError;
use crate::metrics;
use crate::reconcilers::{ParentSource, ReconcileOutcome, TriggerClient};
use anyhow::Result;
use futures::StreamExt;
use kube::api::{Api, DynamicObject};
use kube::runtime::controller::Action;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Client, ResourceExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] pub AutoTriggerError);

/// Work-queue key of a watched object.
fn key_of(obj: &DynamicObject) -> String {
    object_key(&obj.namespace().unwrap_or_default(), &obj.name_any())
}

/// Backoff key of a watched object: its uid, so a recreated parent starts over.
fn backoff_key(obj: &DynamicObject) -> String {
    obj.uid().unwrap_or_else(|| key_of(obj))
}

/// Reconcile one parent and record the outcome.
///
/// # Errors
///
/// Returns the reconciler's error; the controller then consults [`error_policy`].
pub async fn reconcile<P, T>(
    obj: Arc<DynamicObject>,
    ctx: Arc<Context<P, T>>,
) -> Result<Action, ReconcileError>
where
    P: ParentSource,
    T: TriggerClient,
{
    let start = Instant::now();
    let key = key_of(&obj);
    let kind = ctx.parent_kind();
    debug!(key = %key, "Reconciling {}", kind);

    match ctx.reconciler.reconcile(&key).await {
        Ok(outcome) => {
            ctx.backoff.reset(&backoff_key(&obj));
            match outcome {
                ReconcileOutcome::Converged(convergence) => {
                    metrics::record_trigger_changes(
                        kind,
                        convergence.created,
                        convergence.deleted,
                        convergence.delete_failures,
                    );
                    metrics::record_reconciliation_success(kind, start.elapsed());
                }
                ReconcileOutcome::InvalidKey
                | ReconcileOutcome::ParentGone
                | ReconcileOutcome::ParentDeleting => {
                    metrics::record_reconciliation_skipped(kind, start.elapsed());
                }
            }
            Ok(Action::await_change())
        }
        Err(e) => {
            metrics::record_reconciliation_error(kind, e.kind(), start.elapsed());
            Err(ReconcileError(e))
        }
    }
}

/// Error policy: requeue the key after its next backoff delay.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
pub fn error_policy<P, T>(
    obj: Arc<DynamicObject>,
    err: &ReconcileError,
    ctx: Arc<Context<P, T>>,
) -> Action {
    let key = key_of(&obj);
    let delay = ctx.backoff.next_delay(&backoff_key(&obj));
    metrics::record_requeue(ctx.parent_kind());

    if err.0.is_retryable() {
        warn!(
            key = %key,
            error = %err,
            "Reconciliation error - will retry in {}s",
            delay.as_secs()
        );
    } else {
        error!(
            key = %key,
            error = %err,
            "Reconciliation error - will retry in {}s",
            delay.as_secs()
        );
    }
    Action::requeue(delay)
}

/// Run the controller until its watch stream ends.
///
/// # Errors
///
/// Returns an error if the controller cannot be set up.
pub async fn run_controller(client: Client, config: ControllerConfig) -> Result<()> {
    let resource = config.parent.api_resource();
    info!(
        api_version = %resource.api_version,
        kind = %resource.kind,
        namespace = config.namespace.as_deref().unwrap_or("*"),
        filter_schema = %config.filter_schema,
        "Starting {} controller",
        resource.kind
    );

    let api: Api<DynamicObject> = match &config.namespace {
        Some(namespace) => Api::namespaced_with(client.clone(), namespace, &resource),
        None => Api::all_with(client.clone(), &resource),
    };

    let controller = Controller::new_with(api, WatcherConfig::default(), resource);
    let ctx = Arc::new(Context::new(client, controller.store(), config));

    controller
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj_ref, _action)) => debug!(
                    namespace = obj_ref.namespace.as_deref().unwrap_or_default(),
                    "Reconciled {}",
                    obj_ref.name
                ),
                Err(e) => debug!("Controller event: {}", e),
            }
        })
        .await;

    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
