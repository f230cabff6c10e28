// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label constants stamped on every Trigger the controller creates.
//!
//! The same label set is used as the list selector when the controller looks
//! for Triggers it created earlier, so it must be a pure function of the
//! parent's identity.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value for `app.kubernetes.io/managed-by` on Triggers created by this controller
pub const MANAGED_BY_AUTOTRIGGER: &str = "autotrigger";

// ============================================================================
// Autotrigger-Specific Labels
// ============================================================================

/// Label holding the name of the parent resource
pub const AUTOTRIGGER_PARENT_NAME_LABEL: &str = "autotrigger.eventing.knative.dev/parent-name";

/// Label holding the kind of the parent resource
pub const AUTOTRIGGER_PARENT_KIND_LABEL: &str = "autotrigger.eventing.knative.dev/parent-kind";
