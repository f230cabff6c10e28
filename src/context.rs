// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the controller.
//!
//! The controller hands every reconciliation an `Arc<Context>` that contains:
//! - the [`TriggerReconciler`] wired to the parent cache and the Trigger API
//! - the per-key [`RequeueBackoff`] used by the error policy
//! - the [`ControllerConfig`] the controller was started with
//!
//! The parent cache is the reflector store of the controller's own watch, so
//! reading a parent never costs an API round-trip.

use crate::config::ControllerConfig;
use crate::reconcilers::{
    KubeTriggerClient, RequeueBackoff, StoreParentSource, TriggerReconciler,
};
use kube::api::DynamicObject;
use kube::runtime::reflector::Store;
use kube::Client;

/// Shared context passed to the reconcile function and the error policy.
pub struct Context<P = StoreParentSource, T = KubeTriggerClient> {
    /// Converges the Triggers of one parent
    pub reconciler: TriggerReconciler<P, T>,

    /// Requeue delays for failing keys
    pub backoff: RequeueBackoff,

    /// Configuration the controller runs with
    pub config: ControllerConfig,
}

impl Context {
    /// Build the production context from a client and the parent reflector store.
    #[must_use]
    pub fn new(client: Client, parents: Store<DynamicObject>, config: ControllerConfig) -> Self {
        let parents = StoreParentSource::new(parents, config.parent.api_resource());
        let triggers = KubeTriggerClient::new(client);
        let reconciler = TriggerReconciler::new(parents, triggers, config.filter_schema);
        Self::from_parts(reconciler, config)
    }
}

impl<P, T> Context<P, T> {
    /// Build a context around an existing reconciler.
    #[must_use]
    pub fn from_parts(reconciler: TriggerReconciler<P, T>, config: ControllerConfig) -> Self {
        let backoff = RequeueBackoff::new(config.requeue_base, config.requeue_max);
        Self {
            reconciler,
            backoff,
            config,
        }
    }

    /// Kind of the watched parent, used as the metrics resource type.
    #[must_use]
    pub fn parent_kind(&self) -> &str {
        &self.config.parent.kind
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
