// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for auto-triggered parents.
//!
//! # Reconciliation Architecture
//!
//! The autotrigger controller follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor parent resources via the Kubernetes API
//! 2. **Reconcile** - Compare the Triggers the annotation asks for with the Triggers the parent owns
//! 3. **Converge** - Create missing Triggers and delete stale ones
//!
//! # Modules
//!
//! - [`trigger`] - The converge algorithm, [`TriggerReconciler`]
//! - [`client`] - Parent and Trigger access traits and their kube implementations
//! - [`backoff`] - Per-key requeue delays after failures
//!
//! # Example: Reconciling a Key
//!
//! ```rust,no_run
//! use autotrigger::filters::FilterSchema;
//! use autotrigger::reconcilers::{KubeTriggerClient, StoreParentSource, TriggerReconciler};
//!
//! async fn reconcile_key(
//!     parents: StoreParentSource,
//!     triggers: KubeTriggerClient,
//! ) -> anyhow::Result<()> {
//!     let reconciler = TriggerReconciler::new(parents, triggers, FilterSchema::Attributes);
//!     reconciler.reconcile("default/event-display").await?;
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod client;
pub mod trigger;

#[cfg(test)]
pub(crate) mod fake_cluster;

pub use backoff::RequeueBackoff;
pub use client::{KubeTriggerClient, ParentSource, StoreParentSource, TriggerClient};
pub use trigger::{Convergence, ReconcileOutcome, TriggerReconciler};
