// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the autotrigger controller.
//!
//! The taxonomy mirrors how the dispatcher treats each failure:
//!
//! - [`AutoTriggerError::InvalidKey`] and [`AutoTriggerError::ParentNotFound`] are terminal;
//!   the reconciler logs them and reports success so the key is not requeued.
//! - [`AutoTriggerError::AnnotationParse`] is returned until the annotation is fixed.
//! - API failures carry the HTTP status code (when the API server produced one) so
//!   callers can tell `NotFound` and `Conflict` apart from other failures.

use thiserror::Error;

/// HTTP status returned by the API server for a missing object
pub const HTTP_NOT_FOUND: u16 = 404;

/// HTTP status returned by the API server for an optimistic-concurrency conflict
pub const HTTP_CONFLICT: u16 = 409;

/// HTTP status code for rate limiting
pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Errors produced while reconciling the Triggers of one parent resource.
#[derive(Error, Debug)]
pub enum AutoTriggerError {
    /// The work-queue key is not of the form `namespace/name` or `name`.
    #[error("invalid resource key: {key}")]
    InvalidKey {
        /// The offending key
        key: String,
    },

    /// The watched object is missing identity fields the controller relies on.
    #[error("invalid parent resource: {reason}")]
    InvalidParent {
        /// What is missing
        reason: String,
    },

    /// The filter annotation is not a JSON array of string maps.
    #[error("failed to extract auto-trigger from service: {source}")]
    AnnotationParse {
        /// Underlying JSON decode failure
        #[source]
        source: serde_json::Error,
    },

    /// The parent resource no longer exists.
    #[error("parent {namespace}/{name} not found")]
    ParentNotFound {
        /// Namespace of the parent
        namespace: String,
        /// Name of the parent
        name: String,
    },

    /// Fetching the parent resource failed for a reason other than absence.
    #[error("failed to get parent {namespace}/{name}: {reason}")]
    GetParent {
        /// Namespace of the parent
        namespace: String,
        /// Name of the parent
        name: String,
        /// HTTP status code, if the API server answered
        code: Option<u16>,
        /// Error message
        reason: String,
    },

    /// Listing Triggers failed.
    #[error("failed to list Triggers in namespace {namespace}: {reason}")]
    ListTriggers {
        /// Namespace that was listed
        namespace: String,
        /// HTTP status code, if the API server answered
        code: Option<u16>,
        /// Error message
        reason: String,
    },

    /// Creating a Trigger failed.
    #[error("failed to create Trigger for {namespace}/{parent}: {reason}")]
    CreateTrigger {
        /// Namespace of the Trigger
        namespace: String,
        /// Name of the parent the Trigger was built for
        parent: String,
        /// HTTP status code, if the API server answered
        code: Option<u16>,
        /// Error message
        reason: String,
    },

    /// Deleting a Trigger failed.
    #[error("failed to delete Trigger {namespace}/{name}: {reason}")]
    DeleteTrigger {
        /// Namespace of the Trigger
        namespace: String,
        /// Name of the Trigger
        name: String,
        /// HTTP status code, if the API server answered
        code: Option<u16>,
        /// Error message
        reason: String,
    },
}

impl AutoTriggerError {
    /// HTTP status code attached to an API failure, if any.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::GetParent { code, .. }
            | Self::ListTriggers { code, .. }
            | Self::CreateTrigger { code, .. }
            | Self::DeleteTrigger { code, .. } => *code,
            Self::ParentNotFound { .. } => Some(HTTP_NOT_FOUND),
            Self::InvalidKey { .. } | Self::InvalidParent { .. } | Self::AnnotationParse { .. } => {
                None
            }
        }
    }

    /// Whether the error means the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(HTTP_NOT_FOUND)
    }

    /// Whether the error is an optimistic-concurrency conflict.
    ///
    /// Conflicts need no special handling: the whole reconciliation is rerun
    /// against freshly read state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.code() == Some(HTTP_CONFLICT)
    }

    /// Whether retrying the same request can succeed without anything else changing.
    ///
    /// Rate limiting, server errors and transport failures are transient. Client
    /// errors and malformed input are not; they are still requeued, but only a
    /// change to the parent fixes them.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::GetParent { code, .. }
            | Self::ListTriggers { code, .. }
            | Self::CreateTrigger { code, .. }
            | Self::DeleteTrigger { code, .. } => match code {
                None => true,
                Some(code) => *code == HTTP_TOO_MANY_REQUESTS || (500..600).contains(code),
            },
            Self::InvalidKey { .. }
            | Self::InvalidParent { .. }
            | Self::AnnotationParse { .. }
            | Self::ParentNotFound { .. } => false,
        }
    }

    /// Short, stable label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => "invalid_key",
            Self::InvalidParent { .. } => "invalid_parent",
            Self::AnnotationParse { .. } => "annotation_parse",
            Self::ParentNotFound { .. } => "parent_not_found",
            Self::GetParent { .. } => "get_parent",
            Self::ListTriggers { .. } => "list_triggers",
            Self::CreateTrigger { .. } => "create_trigger",
            Self::DeleteTrigger { .. } => "delete_trigger",
        }
    }
}

/// Extract the HTTP status code from a kube client error.
#[must_use]
pub fn kube_error_code(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
