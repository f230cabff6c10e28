// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller configuration.
//!
//! The binary parses [`ControllerArgs`] from the command line and converts them
//! into a [`ControllerConfig`], which is what the library consumes. Every flag
//! has a default, so the controller runs unconfigured against Knative Services.
//!
//! # Example
//!
//! ```rust
//! use autotrigger::config::ControllerConfig;
//!
//! let config = ControllerConfig::default();
//! let resource = config.parent.api_resource();
//! assert_eq!(resource.api_version, "serving.knative.dev/v1");
//! assert_eq!(resource.plural, "services");
//! ```

use crate::constants::{
    DEFAULT_METRICS_BIND_ADDRESS, DEFAULT_PARENT_GROUP, DEFAULT_PARENT_KIND,
    DEFAULT_PARENT_VERSION, DEFAULT_REQUEUE_BASE_SECS, DEFAULT_REQUEUE_MAX_SECS,
};
use crate::filters::FilterSchema;
use anyhow::{bail, Context as _, Result};
use kube::api::{ApiResource, GroupVersionKind};
use std::net::SocketAddr;
use std::time::Duration;

/// Command-line flags of the controller binary.
#[derive(clap::Args, Clone, Debug)]
pub struct ControllerArgs {
    /// API group of the watched parent resource (empty for the core group)
    #[arg(long, default_value = DEFAULT_PARENT_GROUP)]
    pub parent_group: String,

    /// API version of the watched parent resource
    #[arg(long, default_value = DEFAULT_PARENT_VERSION)]
    pub parent_version: String,

    /// Kind of the watched parent resource
    #[arg(long, default_value = DEFAULT_PARENT_KIND)]
    pub parent_kind: String,

    /// Plural resource name of the parent (defaults to the lowercased kind plus "s")
    #[arg(long)]
    pub parent_plural: Option<String>,

    /// Namespace to watch (empty for all namespaces)
    #[arg(long, default_value = "")]
    pub namespace: String,

    /// Trigger filter form: `attributes` or `source-and-type`
    #[arg(long, default_value = "attributes")]
    pub filter_schema: FilterSchema,

    /// Bind address for the /metrics and /healthz endpoints
    #[arg(long, default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: String,

    /// Requeue delay after the first failed reconciliation, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEUE_BASE_SECS)]
    pub requeue_base_secs: u64,

    /// Upper bound for the requeue delay, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEUE_MAX_SECS)]
    pub requeue_max_secs: u64,
}

/// Group, version, kind and plural of the watched parent resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentType {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ParentType {
    /// Describe a parent type, deriving the plural from the kind when not given.
    #[must_use]
    pub fn new(group: &str, version: &str, kind: &str, plural: Option<&str>) -> Self {
        let plural = plural.map_or_else(|| default_plural(kind), str::to_string);
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural,
        }
    }

    /// Dynamic API resource used to watch and read parents.
    #[must_use]
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl Default for ParentType {
    fn default() -> Self {
        Self::new(
            DEFAULT_PARENT_GROUP,
            DEFAULT_PARENT_VERSION,
            DEFAULT_PARENT_KIND,
            None,
        )
    }
}

fn default_plural(kind: &str) -> String {
    format!("{}s", kind.to_lowercase())
}

/// Validated controller configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Resource type whose annotation drives Triggers
    pub parent: ParentType,
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// How annotation entries become Trigger filters
    pub filter_schema: FilterSchema,
    /// Bind address for the metrics and health endpoints
    pub metrics_bind_address: SocketAddr,
    /// Requeue delay after the first failure
    pub requeue_base: Duration,
    /// Upper bound for the requeue delay
    pub requeue_max: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            parent: ParentType::default(),
            namespace: None,
            filter_schema: FilterSchema::default(),
            metrics_bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            requeue_base: Duration::from_secs(DEFAULT_REQUEUE_BASE_SECS),
            requeue_max: Duration::from_secs(DEFAULT_REQUEUE_MAX_SECS),
        }
    }
}

impl TryFrom<ControllerArgs> for ControllerConfig {
    type Error = anyhow::Error;

    fn try_from(args: ControllerArgs) -> Result<Self> {
        if args.parent_kind.is_empty() {
            bail!("--parent-kind must not be empty");
        }
        if args.parent_version.is_empty() {
            bail!("--parent-version must not be empty");
        }
        if args.requeue_base_secs == 0 {
            bail!("--requeue-base-secs must be greater than zero");
        }
        if args.requeue_max_secs < args.requeue_base_secs {
            bail!(
                "--requeue-max-secs ({}) must not be less than --requeue-base-secs ({})",
                args.requeue_max_secs,
                args.requeue_base_secs
            );
        }

        let metrics_bind_address = args
            .metrics_bind_address
            .parse::<SocketAddr>()
            .with_context(|| {
                format!(
                    "invalid --metrics-bind-address '{}'",
                    args.metrics_bind_address
                )
            })?;

        let namespace = Some(args.namespace).filter(|ns| !ns.is_empty());

        Ok(Self {
            parent: ParentType::new(
                &args.parent_group,
                &args.parent_version,
                &args.parent_kind,
                args.parent_plural.as_deref(),
            ),
            namespace,
            filter_schema: args.filter_schema,
            metrics_bind_address,
            requeue_base: Duration::from_secs(args.requeue_base_secs),
            requeue_max: Duration::from_secs(args.requeue_max_secs),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
