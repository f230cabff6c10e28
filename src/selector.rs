// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label selector and ownership utilities for Trigger lookups.
//!
//! Triggers are listed with the parent's label set, but a label match alone does
//! not make a Trigger ours: anyone can stamp the same labels. Only Triggers whose
//! controller owner reference points at the parent take part in reconciliation.
//!
//! # Example
//!
//! ```rust,no_run
//! use autotrigger::addressable::Addressable;
//! use autotrigger::crd::Trigger;
//! use autotrigger::selector::filter_owned;
//!
//! # fn example(parent: Addressable, listed: Vec<Trigger>) {
//! let owned = filter_owned(&parent, listed);
//! # }
//! ```

use crate::addressable::Addressable;
use crate::crd::Trigger;
use std::collections::BTreeMap;

/// Render a label map as an equality-based selector string (`k1=v1,k2=v2`).
#[must_use]
pub fn selector_from_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Check whether every label in `selector` is present with the same value in `labels`.
#[must_use]
pub fn labels_match(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Check whether `trigger` is controlled by `parent`.
///
/// True when the Trigger has an owner reference with `controller: true` whose
/// uid, kind and name all match the parent.
#[must_use]
pub fn is_controlled_by(trigger: &Trigger, parent: &Addressable) -> bool {
    trigger
        .metadata
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|owner| owner.controller == Some(true))
        .is_some_and(|owner| {
            owner.uid == parent.uid && owner.kind == parent.kind && owner.name == parent.name
        })
}

/// Keep only the candidates controlled by `parent`, preserving encounter order.
#[must_use]
pub fn filter_owned(parent: &Addressable, candidates: Vec<Trigger>) -> Vec<Trigger> {
    candidates
        .into_iter()
        .filter(|trigger| is_controlled_by(trigger, parent))
        .collect()
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
