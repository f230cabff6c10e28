// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Parsing of the trigger filter annotation.
//!
//! A parent opts in to Triggers by carrying the [`FILTER_ANNOTATION`] annotation,
//! whose value is a JSON array of string maps. Each element becomes one Trigger:
//!
//! ```text
//! trigger.eventing.knative.dev/filter: '[{"type":"foo","source":"bar"},{"broker":"b2"}]'
//! ```
//!
//! The reserved `broker` key picks the broker (`default` when absent). How the
//! remaining keys become a Trigger filter depends on the [`FilterSchema`]:
//!
//! - [`FilterSchema::Attributes`] copies every other key into `filter.attributes`.
//! - [`FilterSchema::SourceAndType`] reads only `type` and `source` into the legacy
//!   `filter.sourceAndType` form and ignores other keys.

use crate::constants::{
    ANY_FILTER, BROKER_KEY, DEFAULT_BROKER, FILTER_ANNOTATION, SOURCE_KEY, TYPE_KEY,
};
use crate::crd::{TriggerFilter, TriggerFilterSourceAndType};
use crate::errors::AutoTriggerError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Annotation values that all mean "one Trigger with default settings".
const DEFAULT_FILTER_VALUES: [&str; 3] = ["", "[]", "[{}]"];

/// Which Trigger filter form annotation keys are translated into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterSchema {
    /// Free-form exact-match attribute filters.
    #[default]
    Attributes,
    /// Legacy fixed `type`/`source` filter.
    SourceAndType,
}

impl FromStr for FilterSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attributes" => Ok(Self::Attributes),
            "source-and-type" | "sourceandtype" => Ok(Self::SourceAndType),
            other => Err(format!(
                "unknown filter schema '{other}', expected 'attributes' or 'source-and-type'"
            )),
        }
    }
}

impl fmt::Display for FilterSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attributes => f.write_str("attributes"),
            Self::SourceAndType => f.write_str("source-and-type"),
        }
    }
}

/// One parsed element of the filter annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterSpec {
    /// Broker plus free-form attribute filters.
    Attributes {
        broker: String,
        attributes: BTreeMap<String, String>,
    },
    /// Broker plus legacy type/source filter.
    SourceAndType {
        broker: String,
        event_type: String,
        source: String,
    },
}

impl FilterSpec {
    /// Resolve one raw annotation element under the given schema.
    #[must_use]
    pub fn from_map(mut raw: BTreeMap<String, String>, schema: FilterSchema) -> Self {
        let broker = raw
            .remove(BROKER_KEY)
            .unwrap_or_else(|| DEFAULT_BROKER.to_string());

        match schema {
            FilterSchema::Attributes => Self::Attributes {
                broker,
                attributes: raw,
            },
            FilterSchema::SourceAndType => Self::SourceAndType {
                broker,
                event_type: raw
                    .remove(TYPE_KEY)
                    .unwrap_or_else(|| ANY_FILTER.to_string()),
                source: raw
                    .remove(SOURCE_KEY)
                    .unwrap_or_else(|| ANY_FILTER.to_string()),
            },
        }
    }

    #[must_use]
    pub fn broker(&self) -> &str {
        match self {
            Self::Attributes { broker, .. } | Self::SourceAndType { broker, .. } => broker,
        }
    }

    /// The Trigger filter this specification translates to.
    #[must_use]
    pub fn trigger_filter(&self) -> TriggerFilter {
        match self {
            Self::Attributes { attributes, .. } => TriggerFilter {
                source_and_type: None,
                attributes: Some(attributes.clone()),
            },
            Self::SourceAndType {
                event_type, source, ..
            } => TriggerFilter {
                source_and_type: Some(TriggerFilterSourceAndType {
                    event_type: event_type.clone(),
                    source: source.clone(),
                }),
                attributes: None,
            },
        }
    }
}

/// Parse the filter annotation of a parent resource.
///
/// - Annotation absent: no filters, so no Triggers are wanted.
/// - `""`, `"[]"` or `"[{}]"`: exactly one filter with every default applied.
/// - Anything else is decoded as a JSON array of string maps; `null` decodes to
///   no filters.
///
/// # Errors
///
/// Returns [`AutoTriggerError::AnnotationParse`] when the value is not a JSON
/// array of string-to-string maps.
pub fn parse_filters(
    annotations: &BTreeMap<String, String>,
    schema: FilterSchema,
) -> Result<Vec<FilterSpec>, AutoTriggerError> {
    let Some(raw) = annotations.get(FILTER_ANNOTATION) else {
        return Ok(Vec::new());
    };

    let raw_filters: Vec<BTreeMap<String, String>> =
        if DEFAULT_FILTER_VALUES.contains(&raw.as_str()) {
            vec![BTreeMap::new()]
        } else {
            serde_json::from_str::<Option<Vec<BTreeMap<String, String>>>>(raw)
                .map_err(|source| AutoTriggerError::AnnotationParse { source })?
                .unwrap_or_default()
        };

    Ok(raw_filters
        .into_iter()
        .map(|raw| FilterSpec::from_map(raw, schema))
        .collect())
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod filters_tests;
