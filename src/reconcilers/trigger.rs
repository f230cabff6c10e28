// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Trigger reconciliation for annotated parent resources.
//!
//! One reconciliation makes the Triggers owned by a parent match the parent's
//! filter annotation:
//!
//! 1. Fetch the parent. A missing parent is not an error; a parent being deleted
//!    is left to the garbage collector, which removes its Triggers through the
//!    controller owner reference.
//! 2. List Triggers carrying the parent's labels and keep those it controls.
//! 3. Build the desired Triggers from the annotation.
//! 4. Match every desired Trigger against the first semantically equal existing
//!    one, create the unmatched, and delete whatever existing Triggers are left.
//!
//! Existing Triggers are never updated in place: a Trigger is either still wanted
//! or stale. A failed create aborts the pass and is returned for retry; Triggers
//! created before the failure are matched, not recreated, on the next pass. A failed
//! delete is logged and left for a later pass.

use crate::addressable::{split_key, Addressable};
use crate::crd::{Trigger, TriggerFilter, TriggerSpec};
use crate::errors::AutoTriggerError;
use crate::filters::FilterSchema;
use crate::reconcilers::client::{ParentSource, TriggerClient};
use crate::selector::filter_owned;
use crate::trigger_resources::{make_labels, make_triggers};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// What a successful call to [`TriggerReconciler::reconcile`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileOutcome {
    /// The key could not be split; nothing to retry.
    InvalidKey,
    /// The parent no longer exists.
    ParentGone,
    /// The parent is being deleted; its Triggers go with it.
    ParentDeleting,
    /// Triggers were brought in line with the annotation.
    Converged(Convergence),
}

/// Result of converging the Triggers of one parent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Convergence {
    /// The Triggers that now satisfy the desired state, in desired order.
    pub triggers: Vec<Trigger>,
    /// Number of existing Triggers that matched a desired one.
    pub matched: usize,
    /// Number of Triggers created.
    pub created: usize,
    /// Number of stale Triggers deleted.
    pub deleted: usize,
    /// Number of stale Triggers whose deletion failed.
    pub delete_failures: usize,
}

/// Whether an existing Trigger satisfies a desired one.
///
/// Compares spec and labels. The deprecated spec generation is ignored, and an
/// absent label or attribute map equals an empty one. Names are never compared:
/// desired Triggers only carry a `generateName`.
#[must_use]
pub fn semantic_equals(desired: &Trigger, existing: &Trigger) -> bool {
    comparable_spec(&desired.spec) == comparable_spec(&existing.spec)
        && labels_or_empty(desired) == labels_or_empty(existing)
}

fn comparable_spec(spec: &TriggerSpec) -> TriggerSpec {
    let filter = spec.filter.as_ref().map(|filter| TriggerFilter {
        source_and_type: filter.source_and_type.clone(),
        attributes: filter
            .attributes
            .clone()
            .filter(|attributes| !attributes.is_empty()),
    });

    TriggerSpec {
        deprecated_generation: None,
        filter,
        ..spec.clone()
    }
}

fn labels_or_empty(trigger: &Trigger) -> BTreeMap<String, String> {
    trigger.metadata.labels.clone().unwrap_or_default()
}

/// Remove and return the first Trigger in `triggers` semantically equal to `like`.
pub fn extract_trigger_like(triggers: &mut Vec<Trigger>, like: &Trigger) -> Option<Trigger> {
    let index = triggers
        .iter()
        .position(|trigger| semantic_equals(like, trigger))?;
    Some(triggers.remove(index))
}

/// Converges the Triggers of parent resources against their filter annotation.
pub struct TriggerReconciler<P, T> {
    parents: P,
    triggers: T,
    schema: FilterSchema,
}

impl<P, T> TriggerReconciler<P, T>
where
    P: ParentSource,
    T: TriggerClient,
{
    #[must_use]
    pub fn new(parents: P, triggers: T, schema: FilterSchema) -> Self {
        Self {
            parents,
            triggers,
            schema,
        }
    }

    /// Reconcile the parent identified by a `namespace/name` work-queue key.
    ///
    /// `Ok` means the key needs no retry. Invalid keys and missing parents are
    /// logged and reported as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error, which should lead to a requeue, if the parent cannot be
    /// read, the annotation is malformed, listing fails, or a create fails.
    pub async fn reconcile(&self, key: &str) -> Result<ReconcileOutcome, AutoTriggerError> {
        let (namespace, name) = match split_key(key) {
            Ok(parts) => parts,
            Err(e) => {
                error!(key = %key, "invalid resource key: {}", e);
                return Ok(ReconcileOutcome::InvalidKey);
            }
        };

        let parent = match self.parents.get_parent(&namespace, &name).await {
            Ok(parent) => parent,
            Err(e) if e.is_not_found() => {
                error!(key = %key, "service {:?} in work queue no longer exists", key);
                return Ok(ReconcileOutcome::ParentGone);
            }
            Err(e) => return Err(e),
        };

        self.reconcile_parent(&parent).await
    }

    /// Reconcile the Triggers of an already fetched parent.
    ///
    /// # Errors
    ///
    /// See [`TriggerReconciler::reconcile`].
    pub async fn reconcile_parent(
        &self,
        parent: &Addressable,
    ) -> Result<ReconcileOutcome, AutoTriggerError> {
        if parent.is_being_deleted() {
            debug!(
                namespace = %parent.namespace,
                name = %parent.name,
                "Parent is being deleted, owned Triggers are garbage collected"
            );
            return Ok(ReconcileOutcome::ParentDeleting);
        }

        let selector = make_labels(parent);
        let existing = match self
            .triggers
            .list_triggers(&parent.namespace, &selector)
            .await
        {
            Ok(listed) => filter_owned(parent, listed),
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                error!(
                    namespace = %parent.namespace,
                    name = %parent.name,
                    "Failed to Get Triggers for Service {:?}: {}",
                    parent.name,
                    e
                );
                return Err(e);
            }
        };

        let desired = make_triggers(parent, self.schema)?;

        let convergence = if existing.is_empty() {
            self.create_triggers(parent, desired).await
        } else {
            self.reconcile_triggers(parent, existing, desired).await
        };

        match convergence {
            Ok(convergence) => {
                debug!(
                    namespace = %parent.namespace,
                    name = %parent.name,
                    matched = convergence.matched,
                    created = convergence.created,
                    deleted = convergence.deleted,
                    delete_failures = convergence.delete_failures,
                    "Triggers converged"
                );
                Ok(ReconcileOutcome::Converged(convergence))
            }
            Err(e) => {
                error!(
                    namespace = %parent.namespace,
                    name = %parent.name,
                    "Failed to reconcile Triggers for Service {:?}: {}",
                    parent.name,
                    e
                );
                Err(e)
            }
        }
    }

    /// Create every desired Trigger, stopping at the first failure.
    ///
    /// Used when the parent owns no Triggers yet.
    async fn create_triggers(
        &self,
        parent: &Addressable,
        desired: Vec<Trigger>,
    ) -> Result<Convergence, AutoTriggerError> {
        let mut convergence = Convergence::default();
        for trigger in desired {
            let created = self.create_trigger(parent, &trigger).await?;
            convergence.triggers.push(created);
            convergence.created += 1;
        }
        Ok(convergence)
    }

    /// Diff desired against existing Triggers and converge.
    async fn reconcile_triggers(
        &self,
        parent: &Addressable,
        mut existing: Vec<Trigger>,
        desired: Vec<Trigger>,
    ) -> Result<Convergence, AutoTriggerError> {
        let mut convergence = Convergence::default();

        for desired_trigger in desired {
            let trigger = match extract_trigger_like(&mut existing, &desired_trigger) {
                Some(matched) => {
                    convergence.matched += 1;
                    matched
                }
                None => {
                    let created = self.create_trigger(parent, &desired_trigger).await?;
                    convergence.created += 1;
                    created
                }
            };
            convergence.triggers.push(trigger);
        }

        for stale in existing {
            let name = stale.name_any();
            match self.triggers.delete_trigger(&parent.namespace, &name).await {
                Ok(()) => {
                    info!(
                        namespace = %parent.namespace,
                        parent = %parent.name,
                        "Deleted stale Trigger {}",
                        name
                    );
                    convergence.deleted += 1;
                }
                Err(e) => {
                    error!(
                        namespace = %parent.namespace,
                        parent = %parent.name,
                        "Failed to delete Trigger {:?}: {}",
                        name,
                        e
                    );
                    convergence.delete_failures += 1;
                }
            }
        }

        Ok(convergence)
    }

    async fn create_trigger(
        &self,
        parent: &Addressable,
        trigger: &Trigger,
    ) -> Result<Trigger, AutoTriggerError> {
        let created = self
            .triggers
            .create_trigger(&parent.namespace, trigger)
            .await?;
        info!(
            namespace = %parent.namespace,
            parent = %parent.name,
            broker = %created.spec.broker,
            "Created Trigger {}",
            created.name_any()
        );
        Ok(created)
    }
}
